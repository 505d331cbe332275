use crate::errors::{ErrorKind, Result};
use smallvec::SmallVec;

/// A sampled vector. Never longer than a quaternion.
pub type KeyVector = SmallVec<[f64; 4]>;

/// What an animation key animates. The discriminants are the type numbers
/// written to the file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// WXYZ quaternion.
    QuaternionRotation = 0,
    Scale = 1,
    Translation = 2,
    /// XYZ Euler angles, degrees.
    EulerRotation = 3,
}

impl KeyType {
    pub fn from_index(index: u32) -> Result<KeyType> {
        Ok(match index {
            0 => KeyType::QuaternionRotation,
            1 => KeyType::Scale,
            2 => KeyType::Translation,
            3 => KeyType::EulerRotation,
            _ => bail!(ErrorKind::InvalidKeyType(index)),
        })
    }

    pub fn index(self) -> u32 {
        self as u32
    }

    /// Length of every vector in a key of this type.
    pub fn arity(self) -> usize {
        match self {
            KeyType::QuaternionRotation => 4,
            KeyType::Scale | KeyType::Translation | KeyType::EulerRotation => 3,
        }
    }
}

/// A list of (frame number, vector) samples of one channel of a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationKey {
    key_type: KeyType,
    keys: Vec<(i32, KeyVector)>,
}

impl AnimationKey {
    pub fn new(key_type: KeyType) -> AnimationKey {
        AnimationKey { key_type, keys: vec![] }
    }

    /// Like `new`, but from the type number used in the file.
    pub fn with_type_index(index: u32) -> Result<AnimationKey> {
        Ok(AnimationKey::new(KeyType::from_index(index)?))
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn keys(&self) -> &[(i32, KeyVector)] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn add_key(&mut self, frame: i32, vector: &[f64]) -> Result<&(i32, KeyVector)> {
        let expected = self.key_type.arity();
        if vector.len() != expected {
            bail!(ErrorKind::KeySizeMismatch(self.key_type, expected, vector.len()));
        }
        self.keys.push((frame, vector.iter().cloned().collect()));
        Ok(&self.keys[self.keys.len() - 1])
    }

    /// Smallest and largest frame number, or `None` if there are no keys.
    pub fn frame_range(&self) -> Option<(i32, i32)> {
        let start = self.keys.iter().map(|k| k.0).min()?;
        let end = self.keys.iter().map(|k| k.0).max()?;
        Some((start, end))
    }
}

#[test]
fn test_key_size_mismatch() {
    let mut key = AnimationKey::new(KeyType::Translation);
    let err = key.add_key(0, &[1.0, 2.0]).unwrap_err();
    match *err.kind() {
        ErrorKind::KeySizeMismatch(KeyType::Translation, 3, 2) => (),
        ref k => panic!("unexpected error {:?}", k),
    }
    assert!(key.is_empty());

    let mut key = AnimationKey::new(KeyType::QuaternionRotation);
    assert!(key.add_key(0, &[1.0, 0.0, 0.0]).is_err());
    assert!(key.add_key(0, &[1.0, 0.0, 0.0, 0.0, 0.0]).is_err());
}

#[test]
fn test_add_key_keeps_vector() {
    let mut key = AnimationKey::new(KeyType::QuaternionRotation);
    {
        let added = key.add_key(7, &[0.5, -0.5, 0.25, 1.0]).unwrap();
        assert_eq!(added.0, 7);
        assert_eq!(&added.1[..], &[0.5, -0.5, 0.25, 1.0]);
    }
    key.add_key(3, &[1.0, 0.0, 0.0, 0.0]).unwrap();
    assert_eq!(key.keys().len(), 2);
    assert_eq!(&key.keys()[0].1[..], &[0.5, -0.5, 0.25, 1.0]);
    assert_eq!(key.frame_range(), Some((3, 7)));
}

#[test]
fn test_key_type_index() {
    for i in 0..4 {
        assert_eq!(KeyType::from_index(i).unwrap().index(), i);
    }
    assert_eq!(KeyType::from_index(2).unwrap().arity(), 3);
    assert_eq!(KeyType::QuaternionRotation.arity(), 4);
    match *AnimationKey::with_type_index(4).unwrap_err().kind() {
        ErrorKind::InvalidKeyType(4) => (),
        ref k => panic!("unexpected error {:?}", k),
    }
}
