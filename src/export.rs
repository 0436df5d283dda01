// export.rs - Wavefront OBJ export of world-positioned mesh instances
//
// Layout: one leading comment line, every `v` line, then every `f` line.
// Face indices are 1-based and global: each instance's local indices are
// shifted by the vertex count of all instances before it.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use glam::{Affine3A, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};

const HEADER: &str = "# massing-engine OBJ export";

/// Anything the exporter can walk: local vertices plus a world transform
pub trait MeshSource {
    fn local_vertices(&self) -> &[Vec3];

    /// Triangles as local vertex indices. `None` means consecutive vertex
    /// triples form the triangles.
    fn triangles(&self) -> Option<&[[u32; 3]]> {
        None
    }

    fn world_transform(&self) -> Affine3A;
}

/// A positioned mesh owned by the caller's scene
#[derive(Debug, Clone, PartialEq)]
pub struct MeshInstance {
    pub vertices: Vec<Vec3>,
    pub indices: Option<Vec<[u32; 3]>>,
    pub transform: Affine3A,
}

impl MeshInstance {
    /// Non-indexed instance: every three vertices form a triangle
    pub fn triangle_soup(vertices: Vec<Vec3>, transform: Affine3A) -> Self {
        Self { vertices, indices: None, transform }
    }

    pub fn indexed(vertices: Vec<Vec3>, indices: Vec<[u32; 3]>, transform: Affine3A) -> Self {
        Self { vertices, indices: Some(indices), transform }
    }
}

impl MeshSource for MeshInstance {
    fn local_vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    fn triangles(&self) -> Option<&[[u32; 3]]> {
        self.indices.as_deref()
    }

    fn world_transform(&self) -> Affine3A {
        self.transform
    }
}

/// What to do with an instance whose geometry cannot be fully triangulated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Abort the whole export with `Error::InvalidGeometry`
    #[default]
    Reject,
    /// Keep all vertices, drop the unusable triangles, record a warning
    Truncate,
}

/// Finished OBJ text plus bookkeeping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportDocument {
    pub text: String,
    pub vertex_count: usize,
    pub face_count: usize,
    /// One entry per instance exported in degraded form
    pub warnings: Vec<String>,
}

impl ExportDocument {
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let mut f = BufWriter::new(File::create(path)?);
        f.write_all(self.text.as_bytes())?;
        f.flush()?;
        info!(path = %path.display(), vertices = self.vertex_count, faces = self.face_count, "wrote OBJ");
        Ok(())
    }
}

/// Serialize `instances`, in order, to OBJ text
pub fn export_obj<M: MeshSource>(instances: &[M], policy: MalformedPolicy) -> Result<ExportDocument> {
    let mut verts = String::new();
    let mut faces = String::new();
    let mut doc = ExportDocument::default();
    let mut offset = 0usize;

    for (i, inst) in instances.iter().enumerate() {
        let local = inst.local_vertices();
        if local.is_empty() {
            continue;
        }

        let tris = match triangles_for(inst) {
            Ok(tris) => tris,
            Err(Malformed { tris, reason }) => match policy {
                MalformedPolicy::Reject => return Err(Error::InvalidGeometry { instance: i, reason }),
                MalformedPolicy::Truncate => {
                    warn!(instance = i, %reason, "degraded export");
                    doc.warnings.push(format!("instance {}: {}", i, reason));
                    tris
                }
            },
        };

        let xf = inst.world_transform();
        for v in local {
            let p = xf.transform_point3(*v);
            let _ = writeln!(verts, "v {:.4} {:.4} {:.4}", tidy(p.x), tidy(p.y), tidy(p.z));
        }
        for [a, b, c] in &tris {
            let _ = writeln!(faces, "f {} {} {}", a + offset + 1, b + offset + 1, c + offset + 1);
        }

        doc.face_count += tris.len();
        offset += local.len();
    }

    doc.vertex_count = offset;
    doc.text.reserve(HEADER.len() + 1 + verts.len() + faces.len());
    doc.text.push_str(HEADER);
    doc.text.push('\n');
    doc.text.push_str(&verts);
    doc.text.push_str(&faces);
    Ok(doc)
}

/// Snap values that would print as `-0.0000` to zero
#[inline]
fn tidy(v: f32) -> f32 {
    if v.abs() < 5e-5 { 0.0 } else { v }
}

struct Malformed {
    tris: Vec<[usize; 3]>,
    reason: String,
}

/// Resolve an instance's triangles to local indices. On failure, returns the
/// usable subset alongside the reason.
fn triangles_for<M: MeshSource>(inst: &M) -> std::result::Result<Vec<[usize; 3]>, Malformed> {
    let n = inst.local_vertices().len();

    match inst.triangles() {
        Some(indexed) => {
            let mut tris = Vec::with_capacity(indexed.len());
            let mut bad = 0usize;
            for &t in indexed {
                let t = t.map(|i| i as usize);
                if t.iter().all(|&i| i < n) {
                    tris.push(t);
                } else {
                    bad += 1;
                }
            }
            if bad == 0 {
                Ok(tris)
            } else {
                Err(Malformed {
                    tris,
                    reason: format!("{} triangle(s) index past {} vertices", bad, n),
                })
            }
        }
        None => {
            let tris: Vec<[usize; 3]> = (0..n / 3).map(|f| [f * 3, f * 3 + 1, f * 3 + 2]).collect();
            if n % 3 == 0 {
                Ok(tris)
            } else {
                Err(Malformed {
                    tris,
                    reason: format!("{} vertices is not a multiple of 3, dropped {} trailing", n, n % 3),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines<'a>(doc: &'a ExportDocument, prefix: &str) -> Vec<&'a str> {
        doc.text.lines().filter(|l| l.starts_with(prefix)).collect()
    }

    fn face_indices(doc: &ExportDocument) -> Vec<usize> {
        lines(doc, "f ")
            .iter()
            .flat_map(|l| l[2..].split(' ').map(|i| i.parse::<usize>().unwrap()))
            .collect()
    }

    #[test]
    fn test_header_then_vertices_then_faces() {
        let tri = MeshInstance::triangle_soup(vec![Vec3::ZERO, Vec3::X, Vec3::Y], Affine3A::IDENTITY);
        let doc = export_obj(&[tri.clone(), tri], MalformedPolicy::Reject).unwrap();
        let all: Vec<&str> = doc.text.lines().collect();

        assert!(all[0].starts_with('#'));
        assert!(all[1..7].iter().all(|l| l.starts_with("v ")));
        assert_eq!(&all[7..], &["f 1 2 3", "f 4 5 6"]);
    }

    #[test]
    fn test_world_transform_applied() {
        let xf = Affine3A::from_scale_rotation_translation(
            Vec3::new(2.0, 3.0, 1.0),
            glam::Quat::IDENTITY,
            Vec3::new(1.0, 0.0, -0.5),
        );
        let inst = MeshInstance::triangle_soup(vec![Vec3::ONE, Vec3::ZERO, Vec3::new(0.12345, 0.0, 0.0)], xf);
        let doc = export_obj(&[inst], MalformedPolicy::Reject).unwrap();
        assert_eq!(lines(&doc, "v "), vec!["v 3.0000 3.0000 0.5000", "v 1.0000 0.0000 -0.5000", "v 1.2469 0.0000 -0.5000"]);
    }

    #[test]
    fn test_no_negative_zero() {
        let tiny = MeshInstance::triangle_soup(
            vec![Vec3::new(-0.0, -1e-6, -0.00004), Vec3::X, Vec3::Z],
            Affine3A::from_rotation_y(std::f32::consts::PI),
        );
        let doc = export_obj(&[tiny], MalformedPolicy::Reject).unwrap();
        assert_eq!(lines(&doc, "v "), vec!["v 0.0000 0.0000 0.0000", "v -1.0000 0.0000 0.0000", "v 0.0000 0.0000 -1.0000"]);
        assert!(!doc.text.contains("-0.0000"));
    }

    #[test]
    fn test_empty_instance_skipped() {
        let tri = MeshInstance::triangle_soup(vec![Vec3::ZERO, Vec3::X, Vec3::Y], Affine3A::IDENTITY);
        let empty = MeshInstance::triangle_soup(vec![], Affine3A::IDENTITY);
        let doc = export_obj(&[tri.clone(), empty, tri], MalformedPolicy::Reject).unwrap();
        assert_eq!(doc.vertex_count, 6);
        assert_eq!(face_indices(&doc), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_reject_policy() {
        let bad = MeshInstance::triangle_soup(vec![Vec3::ZERO; 4], Affine3A::IDENTITY);
        let ok = MeshInstance::triangle_soup(vec![Vec3::ZERO; 3], Affine3A::IDENTITY);
        match export_obj(&[ok, bad], MalformedPolicy::Reject) {
            Err(Error::InvalidGeometry { instance, .. }) => assert_eq!(instance, 1),
            other => panic!("Expected InvalidGeometry, got {:?}", other),
        }
    }

    #[test]
    fn test_truncate_policy_keeps_offsets() {
        let bad = MeshInstance::triangle_soup(vec![Vec3::ZERO; 5], Affine3A::IDENTITY);
        let ok = MeshInstance::triangle_soup(vec![Vec3::ZERO; 3], Affine3A::IDENTITY);
        let doc = export_obj(&[bad, ok], MalformedPolicy::Truncate).unwrap();

        assert!(doc.is_degraded());
        assert_eq!(doc.warnings.len(), 1);
        assert_eq!(doc.vertex_count, 8);
        assert_eq!(face_indices(&doc), vec![1, 2, 3, 6, 7, 8]);
    }

    #[test]
    fn test_out_of_range_index() {
        let inst = MeshInstance::indexed(vec![Vec3::ZERO; 3], vec![[0, 1, 2], [0, 1, 3]], Affine3A::IDENTITY);
        assert!(matches!(
            export_obj(&[inst.clone()], MalformedPolicy::Reject),
            Err(Error::InvalidGeometry { instance: 0, .. })
        ));
        let doc = export_obj(&[inst], MalformedPolicy::Truncate).unwrap();
        assert_eq!(doc.face_count, 1);
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.obj");
        let tri = MeshInstance::triangle_soup(vec![Vec3::ZERO, Vec3::X, Vec3::Y], Affine3A::IDENTITY);
        let doc = export_obj(&[tri], MalformedPolicy::Reject).unwrap();
        doc.write_to(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), doc.text);
    }
}
