pub static DEFAULT_DIFFUSE: [f64; 4] = [0.7, 0.7, 0.7, 1.0];
pub static DEFAULT_SPECULAR: [f64; 3] = [0.35, 0.35, 0.35];
pub static DEFAULT_EMISSIVE: [f64; 3] = [0.0, 0.0, 0.0];
pub static DEFAULT_AMBIENT: [f64; 3] = [0.5, 0.5, 0.5];
pub static DEFAULT_HARDNESS: f64 = 200.0;

/// XSI shading model.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShadingType {
    Constant = 0,
    Lambert = 1,
    Phong = 2,
    Blinn = 3,
    Shadow = 4,
    VertexColor = 5,
}

impl ShadingType {
    pub fn from_index(index: i64) -> Option<ShadingType> {
        Some(match index {
            0 => ShadingType::Constant,
            1 => ShadingType::Lambert,
            2 => ShadingType::Phong,
            3 => ShadingType::Blinn,
            4 => ShadingType::Shadow,
            5 => ShadingType::VertexColor,
            _ => return None,
        })
    }

    pub fn index(self) -> u32 {
        self as u32
    }
}

/// Surface properties of a face. Two materials are the same material when
/// all their fields are equal.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub diffuse: [f64; 4],
    pub specular: [f64; 3],
    pub ambient: [f64; 3],
    pub emissive: [f64; 3],
    pub hardness: f64,
    pub shading_type: ShadingType,
    pub texture: Option<String>,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            diffuse: DEFAULT_DIFFUSE,
            specular: DEFAULT_SPECULAR,
            ambient: DEFAULT_AMBIENT,
            emissive: DEFAULT_EMISSIVE,
            hardness: DEFAULT_HARDNESS,
            shading_type: ShadingType::Phong,
            texture: None,
        }
    }
}

impl Material {
    /// Default material with the given diffuse color.
    pub fn with_diffuse(diffuse: [f64; 4]) -> Material {
        Material { diffuse, ..Material::default() }
    }
}

/// Every distinct material of a document, each given a name.
pub struct MaterialLibrary {
    pub materials: Vec<Material>,
}

impl MaterialLibrary {
    pub fn new() -> MaterialLibrary {
        MaterialLibrary { materials: vec![] }
    }

    /// Index of `material` in the library, adding it if it isn't already
    /// there.
    pub fn insert(&mut self, material: &Material) -> usize {
        match self.index_of(material) {
            Some(i) => i,
            None => {
                self.materials.push(material.clone());
                self.materials.len() - 1
            }
        }
    }

    pub fn index_of(&self, material: &Material) -> Option<usize> {
        self.materials.iter().position(|m| m == material)
    }

    pub fn name(&self, index: usize) -> String {
        format!("material{}", index)
    }

    /// Name of `material`, which must be in the library.
    pub fn name_of(&self, material: &Material) -> Option<String> {
        self.index_of(material).map(|i| self.name(i))
    }
}

#[test]
fn test_structural_dedupe() {
    let red = Material::with_diffuse([1.0, 0.0, 0.0, 1.0]);
    let mut lib = MaterialLibrary::new();
    assert_eq!(lib.insert(&Material::default()), 0);
    assert_eq!(lib.insert(&red), 1);
    assert_eq!(lib.insert(&Material::with_diffuse([1.0, 0.0, 0.0, 1.0])), 1);
    assert_eq!(lib.insert(&Material::default()), 0);
    assert_eq!(lib.materials.len(), 2);
    assert_eq!(lib.name_of(&red).unwrap(), "material1");

    let textured = Material { texture: Some("a.tga".to_string()), ..red.clone() };
    assert!(textured != red);
    assert_eq!(lib.name_of(&textured), None);
}
