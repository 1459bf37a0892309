use crate::error::DataModelError;
use crate::renderer::{BufferHandle, ComponentType};

/// Describes where one attribute lives inside an interleaved vertex record.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexAttribute {
    /// The attribute name the shader declares, e.g. `POSITION`.
    pub semantic: String,
    pub components: u8,
    pub component_type: ComponentType,
    pub normalized: bool,
    /// Byte offset from the start of the vertex record.
    pub offset: usize,
}

impl VertexAttribute {
    /// A non-normalized `f32` attribute.
    pub fn float(semantic: &str, components: u8, offset: usize) -> VertexAttribute {
        VertexAttribute {
            semantic: semantic.to_string(),
            components,
            component_type: ComponentType::Float,
            normalized: false,
            offset,
        }
    }

    /// Byte offset just past the end of this attribute, or `None` if it
    /// doesn't fit in `usize`.
    pub fn end(&self) -> Option<usize> {
        (self.components as usize)
            .checked_mul(self.component_type.size_in_bytes())
            .and_then(|size| self.offset.checked_add(size))
    }
}

/// Validated interleaved vertex data and triangle indices.
///
/// Immutable once built: the layout checks only run here, never at draw
/// time.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    vertices: Vec<f32>,
    indices: Vec<u32>,
    stride: usize,
    attributes: Vec<VertexAttribute>,
}

impl Geometry {
    pub fn new(
        vertices: Vec<f32>,
        indices: Vec<u32>,
        stride: usize,
        attributes: Vec<VertexAttribute>,
    ) -> Result<Geometry, DataModelError> {
        if stride == 0 {
            return Err(DataModelError::ZeroStride);
        }
        for attribute in &attributes {
            if !(1..=4).contains(&attribute.components) {
                return Err(DataModelError::InvalidComponentCount {
                    semantic: attribute.semantic.clone(),
                    components: attribute.components,
                });
            }
            match attribute.end() {
                Some(end) if end <= stride => {}
                Some(end) => {
                    return Err(DataModelError::AttributeExceedsStride {
                        semantic: attribute.semantic.clone(),
                        end,
                        stride,
                    })
                }
                None => {
                    return Err(DataModelError::AttributeOffsetOverflow {
                        semantic: attribute.semantic.clone(),
                        offset: attribute.offset,
                    })
                }
            }
        }

        let bytes = vertices.len() * std::mem::size_of::<f32>();
        if bytes % stride != 0 {
            return Err(DataModelError::VertexDataMisaligned { bytes, stride });
        }
        let vertex_count = bytes / stride;
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(DataModelError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }

        Ok(Geometry {
            vertices,
            indices,
            stride,
            attributes,
        })
    }

    /// Vertices laid out as `POSITION`, `NORMAL` and `COLOR`, three floats
    /// each, 36 bytes per vertex.
    pub fn position_normal_color(
        vertices: Vec<f32>,
        indices: Vec<u32>,
    ) -> Result<Geometry, DataModelError> {
        let attributes = vec![
            VertexAttribute::float("POSITION", 3, 0),
            VertexAttribute::float("NORMAL", 3, 12),
            VertexAttribute::float("COLOR", 3, 24),
        ];
        Geometry::new(vertices, indices, 36, attributes)
    }

    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() * std::mem::size_of::<f32>() / self.stride
    }
}

/// A [`Geometry`] uploaded to the graphics context. The buffers belong to
/// the scene that created it.
#[derive(Debug)]
pub struct GeometryBuffer {
    pub(crate) geometry: Geometry,
    pub(crate) vertex_buffer: BufferHandle,
    pub(crate) index_buffer: BufferHandle,
}

impl GeometryBuffer {
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn vertex_buffer(&self) -> BufferHandle {
        self.vertex_buffer
    }

    pub fn index_buffer(&self) -> BufferHandle {
        self.index_buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Vec<f32> {
        vec![
            -1.0, -1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, //
            -1.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, //
            1.0, -1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0,
        ]
    }

    #[test]
    fn accepts_interleaved_triangle() {
        let geometry = Geometry::position_normal_color(triangle(), vec![0, 1, 2]).unwrap();
        assert_eq!(geometry.vertex_count(), 3);
        assert_eq!(geometry.stride(), 36);
        assert_eq!(geometry.attributes().len(), 3);
    }

    #[test]
    fn rejects_attribute_past_stride() {
        let attributes = vec![
            VertexAttribute::float("POSITION", 3, 0),
            VertexAttribute::float("COLOR", 3, 16),
        ];
        let err = Geometry::new(triangle(), vec![0, 1, 2], 24, attributes).unwrap_err();
        assert_eq!(
            err,
            DataModelError::AttributeExceedsStride {
                semantic: "COLOR".to_string(),
                end: 28,
                stride: 24,
            }
        );
    }

    #[test]
    fn attribute_ending_exactly_at_stride_is_fine() {
        let attributes = vec![
            VertexAttribute::float("POSITION", 3, 0),
            VertexAttribute::float("NORMAL", 3, 12),
            VertexAttribute::float("COLOR", 3, 24),
        ];
        assert!(Geometry::new(triangle(), vec![0, 1, 2], 36, attributes).is_ok());
    }

    #[test]
    fn rejects_offset_that_overflows() {
        let attributes = vec![VertexAttribute::float("POSITION", 1, usize::MAX - 3)];
        assert_eq!(attributes[0].end(), None);
        let err = Geometry::new(vec![0.0; 9], vec![0], 36, attributes).unwrap_err();
        assert_eq!(
            err,
            DataModelError::AttributeOffsetOverflow {
                semantic: "POSITION".to_string(),
                offset: usize::MAX - 3,
            }
        );
    }

    #[test]
    fn rejects_index_past_last_vertex() {
        let err = Geometry::position_normal_color(triangle(), vec![0, 1, 3]).unwrap_err();
        assert_eq!(
            err,
            DataModelError::IndexOutOfRange {
                index: 3,
                vertex_count: 3,
            }
        );
    }

    #[test]
    fn rejects_partial_vertex_record() {
        let mut vertices = triangle();
        vertices.pop();
        let err = Geometry::position_normal_color(vertices, vec![0, 1]).unwrap_err();
        assert_eq!(
            err,
            DataModelError::VertexDataMisaligned {
                bytes: 104,
                stride: 36,
            }
        );
    }

    #[test]
    fn rejects_zero_stride_and_bad_component_counts() {
        assert_eq!(
            Geometry::new(vec![], vec![], 0, vec![]).unwrap_err(),
            DataModelError::ZeroStride
        );
        let attributes = vec![VertexAttribute::float("POSITION", 5, 0)];
        assert!(matches!(
            Geometry::new(vec![], vec![], 32, attributes),
            Err(DataModelError::InvalidComponentCount { components: 5, .. })
        ));
    }
}
