use std::fmt;
use std::fmt::Write;

/// Wrapper that prints a name restricted to the identifier characters XSI
/// block names allow: letters, digits, underscore and dash. Every other
/// character prints as an underscore. Empty names print as `unnamed`.
pub struct SafeName<'a>(pub &'a str);

impl<'a> fmt::Display for SafeName<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("unnamed");
        }
        for c in self.0.chars() {
            let is_allowed = c.is_ascii_alphanumeric() || c == '_' || c == '-';
            f.write_char(if is_allowed { c } else { '_' })?;
        }
        Ok(())
    }
}

/// Name of a source file as it appears in header blocks: no directories, no
/// `.blend` suffix, spaces turned into underscores.
pub fn source_file_stem(path: &str) -> String {
    let base = path.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(path);
    let base = if base.ends_with(".blend") {
        &base[..base.len() - ".blend".len()]
    } else {
        base
    };
    base.replace(' ', "_")
}

#[test]
fn test_safe_name() {
    assert_eq!(SafeName("My Object!").to_string(), "My_Object_");
    assert_eq!(SafeName("bone.L-01").to_string(), "bone_L-01");
    assert_eq!(SafeName("").to_string(), "unnamed");
    assert_eq!(SafeName("Ärm").to_string(), "_rm");
}

#[test]
fn test_source_file_stem() {
    assert_eq!(source_file_stem("/home/me/my ship.blend"), "my_ship");
    assert_eq!(source_file_stem("C:\\assets\\tank.blend"), "tank");
    assert_eq!(source_file_stem("scene"), "scene");
}
