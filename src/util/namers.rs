use std::collections::HashSet;

/// Hands out names that haven't been handed out before.
pub struct UniqueNamer {
    taken_names: HashSet<String>,
}

impl UniqueNamer {
    pub fn new() -> UniqueNamer {
        UniqueNamer { taken_names: HashSet::new() }
    }

    /// `desired_name` if it's free, else `desired_name` followed by the
    /// smallest positive number that makes it free. The name is taken
    /// afterwards.
    pub fn get_fresh_name(&mut self, desired_name: &str) -> String {
        let mut name = desired_name.to_string();
        let mut n = 0;
        while self.taken_names.contains(&name) {
            n += 1;
            name = format!("{}{}", desired_name, n);
        }
        self.taken_names.insert(name.clone());
        name
    }
}

#[test]
fn test_unique_namer() {
    let mut un = UniqueNamer::new();
    assert_eq!(un.get_fresh_name("A"), "A");
    assert_eq!(un.get_fresh_name("A"), "A1");
    assert_eq!(un.get_fresh_name("A"), "A2");
    assert_eq!(un.get_fresh_name("B"), "B");
    assert_eq!(un.get_fresh_name("A1"), "A11");
    assert_eq!(un.get_fresh_name("bone"), "bone");
}
