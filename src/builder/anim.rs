//! Animation channels and per-frame sampling.
//!
//! The host keys its animation curves by data path strings. They're parsed
//! once, up front, into a table of which channels each object or bone has;
//! the traversal only consults the table.

use crate::basis::{decompose, to_scale, to_translation, RotationMode};
use crate::errors::Result;
use crate::host::{ObjectId, RestState};
use crate::xsi::{AnimationKey, KeyType};
use cgmath::Matrix4;
use std::collections::HashMap;
use std::ops::RangeInclusive;

/// An animatable property.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    Location,
    RotationEuler,
    RotationQuaternion,
    Scale,
}

impl Channel {
    fn from_property(prop: &str) -> Option<Channel> {
        Some(match prop {
            "location" => Channel::Location,
            "rotation_euler" => Channel::RotationEuler,
            "rotation_quaternion" => Channel::RotationQuaternion,
            "scale" => Channel::Scale,
            _ => return None,
        })
    }
}

/// What an animation curve moves.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AnimTarget {
    Object(ObjectId),
    /// A bone of an armature object, by name.
    Bone(ObjectId, String),
}

/// Split a data path like `location` or `pose.bones["Arm"].scale` into the
/// bone name (if any) and the channel. Paths for anything else are `None`.
pub fn parse_data_path(path: &str) -> Option<(Option<&str>, Channel)> {
    const BONE_PREFIX: &str = "pose.bones[\"";
    if path.starts_with(BONE_PREFIX) {
        let rest = &path[BONE_PREFIX.len()..];
        let end = rest.find("\"].")?;
        let bone = &rest[..end];
        let prop = &rest[end + 3..];
        Some((Some(bone), Channel::from_property(prop)?))
    } else {
        Some((None, Channel::from_property(path)?))
    }
}

/// Which channels are keyed on each target.
#[derive(Default)]
pub struct Channels {
    table: HashMap<AnimTarget, Vec<Channel>>,
}

impl Channels {
    /// Scan the actions of `objects`. A curve only counts when it has a
    /// keyframe inside its action's frame range.
    pub fn collect<S: RestState + ?Sized>(scene: &S, objects: &[ObjectId]) -> Channels {
        let mut table: HashMap<AnimTarget, Vec<Channel>> = HashMap::new();

        for &id in objects {
            let action = match scene.action(id) {
                Some(action) => action,
                None => continue,
            };
            let (range_start, range_end) = action.frame_range;

            for fcurve in &action.fcurves {
                let (bone, channel) = match parse_data_path(&fcurve.data_path) {
                    Some(x) => x,
                    None => {
                        trace!("ignoring fcurve {:?} on {:?}", fcurve.data_path, scene.object(id).name);
                        continue;
                    }
                };
                let in_range = fcurve.keyframes.iter()
                    .map(|&k| k.trunc())
                    .any(|k| k >= range_start && k <= range_end);
                if !in_range {
                    continue;
                }

                let target = match bone {
                    Some(name) => AnimTarget::Bone(id, name.to_string()),
                    None => AnimTarget::Object(id),
                };
                let channels = table.entry(target).or_insert_with(Vec::new);
                if !channels.contains(&channel) {
                    channels.push(channel);
                }
            }
        }

        Channels { table }
    }

    pub fn get(&self, target: &AnimTarget) -> &[Channel] {
        self.table.get(target).map(|v| &v[..]).unwrap_or(&[])
    }

    /// Key types to sample for `target`, in the order they're written:
    /// scale, rotation, translation.
    pub fn key_types(&self, target: &AnimTarget, euler: bool) -> Vec<KeyType> {
        let channels = self.get(target);
        let has = |c: Channel| channels.contains(&c);

        let mut key_types = vec![];
        if has(Channel::Scale) {
            key_types.push(KeyType::Scale);
        }
        if has(Channel::RotationEuler) || has(Channel::RotationQuaternion) {
            key_types.push(if euler { KeyType::EulerRotation } else { KeyType::QuaternionRotation });
        }
        if has(Channel::Location) {
            key_types.push(KeyType::Translation);
        }
        key_types
    }
}

/// One key per type, with a sample of `matrix_at` at every frame of
/// `frames`. The matrices are already in the target basis.
pub fn sample_keys<F>(key_types: &[KeyType], frames: RangeInclusive<i32>, mut matrix_at: F) -> Result<Vec<AnimationKey>>
where F: FnMut(i32) -> Matrix4<f64> {
    let mut keys: Vec<AnimationKey> = key_types.iter().map(|&ty| AnimationKey::new(ty)).collect();
    if keys.is_empty() {
        return Ok(keys);
    }

    for t in frames {
        let m = matrix_at(t);
        for key in &mut keys {
            let v = match key.key_type() {
                KeyType::Scale => {
                    let s = to_scale(&m);
                    vec![s.x, s.y, s.z]
                }
                KeyType::Translation => {
                    let p = to_translation(&m);
                    vec![p.x, p.y, p.z]
                }
                KeyType::EulerRotation => decompose(&m, RotationMode::Euler).rotation.to_vec(),
                KeyType::QuaternionRotation => decompose(&m, RotationMode::Quaternion).rotation.to_vec(),
            };
            key.add_key(t, &v)?;
        }
    }

    keys.retain(|key| !key.is_empty());
    Ok(keys)
}

#[test]
fn test_parse_data_path() {
    assert_eq!(parse_data_path("location"), Some((None, Channel::Location)));
    assert_eq!(parse_data_path("rotation_quaternion"), Some((None, Channel::RotationQuaternion)));
    assert_eq!(
        parse_data_path("pose.bones[\"Upper Arm.L\"].rotation_euler"),
        Some((Some("Upper Arm.L"), Channel::RotationEuler)),
    );
    assert_eq!(parse_data_path("pose.bones[\"a\"].scale"), Some((Some("a"), Channel::Scale)));
    assert_eq!(parse_data_path("delta_location"), None);
    assert_eq!(parse_data_path("pose.bones[\"a\"].bbone_curveinx"), None);
    assert_eq!(parse_data_path("pose.bones[\"unterminated"), None);
}

#[test]
fn test_collect_channels() {
    use crate::host::snapshot::SceneSnapshot;
    use crate::host::{Action, FCurve, ObjectKind, SceneInfo};
    use cgmath::One;

    let curve = |path: &str, keyframes: Vec<f64>| FCurve { data_path: path.to_string(), keyframes };
    let mut s = SceneSnapshot::new(SceneInfo::default());
    let id = s.add_object("Rig", ObjectKind::Armature, None, Matrix4::one());
    s.set_action(id, Action {
        frame_range: (1.0, 10.0),
        fcurves: vec![
            curve("location", vec![1.0, 10.0]),
            curve("location", vec![4.0]),
            curve("scale", vec![11.0, 20.0]),
            curve("pose.bones[\"hand\"].rotation_quaternion", vec![5.5]),
            curve("pose.bones[\"hand\"].location", vec![2.0]),
            curve("hide_viewport", vec![2.0]),
        ],
    });
    let channels = Channels::collect(&s, &[id]);

    let object = AnimTarget::Object(id);
    let hand = AnimTarget::Bone(id, "hand".to_string());
    assert_eq!(channels.get(&object), &[Channel::Location]);
    assert_eq!(channels.get(&hand), &[Channel::RotationQuaternion, Channel::Location]);
    assert_eq!(channels.get(&AnimTarget::Bone(id, "foot".to_string())), &[]);

    assert_eq!(channels.key_types(&object, true), vec![KeyType::Translation]);
    assert_eq!(channels.key_types(&hand, true), vec![KeyType::EulerRotation, KeyType::Translation]);
    assert_eq!(channels.key_types(&hand, false), vec![KeyType::QuaternionRotation, KeyType::Translation]);
}

#[test]
fn test_sample_every_frame() {
    use cgmath::vec3;

    let mut seen = vec![];
    let keys = sample_keys(&[KeyType::Scale, KeyType::Translation], 3..=6, |t| {
        seen.push(t);
        Matrix4::from_translation(vec3(t as f64, 0.0, 0.0))
    }).unwrap();

    assert_eq!(seen, vec![3, 4, 5, 6]);
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0].key_type(), KeyType::Scale);
    assert_eq!(keys[1].keys().len(), 4);
    assert_eq!(&keys[1].keys()[2].1[..], &[5.0, 0.0, 0.0]);

    // Empty range: nothing to write.
    let keys = sample_keys(&[KeyType::Scale], 6..=3, |_| Matrix4::from_scale(1.0)).unwrap();
    assert!(keys.is_empty());
}
