use super::Material;
use smallvec::SmallVec;

/// Index tuple of one polygon; usually a tri or a quad.
pub type Face = SmallVec<[u32; 4]>;

/// Polygon mesh of a frame.
///
/// `faces` index `vertices`. The normal, UV and color face lists, when
/// present, have one entry per face and are loop-indexed: each index is a
/// face corner, not a vertex.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub name: Option<String>,

    pub vertices: Vec<[f64; 3]>,
    pub faces: Vec<Face>,

    pub normal_vertices: Vec<[f64; 3]>,
    pub normal_faces: Vec<Face>,

    pub uv_vertices: Vec<[f64; 2]>,
    pub uv_faces: Vec<Face>,

    pub vertex_colors: Vec<[f64; 4]>,
    pub vertex_color_faces: Vec<Face>,

    /// Material of each face. Empty when materials weren't exported.
    pub face_materials: Vec<Material>,
}

impl Mesh {
    pub fn new(name: Option<String>) -> Mesh {
        Mesh { name, ..Mesh::default() }
    }

    pub fn has_normals(&self) -> bool {
        !self.normal_vertices.is_empty()
    }

    pub fn has_uvs(&self) -> bool {
        !self.uv_vertices.is_empty()
    }

    pub fn has_colors(&self) -> bool {
        !self.vertex_colors.is_empty()
    }

    /// Returns the distinct materials in order of first use, and for each
    /// face the index of its material in that list.
    pub fn material_indices(&self) -> (Vec<usize>, Vec<&Material>) {
        let mut materials: Vec<&Material> = vec![];
        let indices: Vec<usize> = self.face_materials.iter()
            .map(|material| {
                match materials.iter().position(|&m| m == material) {
                    Some(i) => i,
                    None => {
                        materials.push(material);
                        materials.len() - 1
                    }
                }
            })
            .collect();
        (indices, materials)
    }
}

#[test]
fn test_material_indices() {
    use smallvec::smallvec;

    let red = Material::with_diffuse([1.0, 0.0, 0.0, 1.0]);
    let mut mesh = Mesh::new(None);
    mesh.faces = vec![smallvec![0, 1, 2], smallvec![0, 2, 3], smallvec![1, 2, 3]];
    mesh.face_materials = vec![red.clone(), Material::default(), red.clone()];

    let (indices, materials) = mesh.material_indices();
    assert_eq!(indices, vec![0, 1, 0]);
    assert_eq!(materials.len(), 2);
    assert_eq!(*materials[0], red);
}
