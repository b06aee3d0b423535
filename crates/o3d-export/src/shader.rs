//! Shader graph boundary and material resolution.
//!
//! The host exposes a material's shader node graph as a [`NodeTree`].
//! The pipeline only ever follows one fixed chain of link categories
//! through it: surface ← bsdf, base colour or texture ← bsdf, uv ←
//! texture, mapping ← uv, uv-map ← mapping-or-texture. Node groups are
//! transparent: links crossing a group boundary are stitched through to
//! the node on the inside before any property is read.
//!
//! Every property has a fallback chain ending in a context-free
//! default, so resolution is total: a missing node, a node-less
//! material or no material at all never raises.

use std::collections::HashMap;

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::math::{euler_xyz, invert_or_identity};
use crate::scene::SourceMaterial;

/// Render engine discriminator for material output nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderTarget {
    /// Matches any engine
    #[default]
    All,
    /// Eevee realtime engine
    Eevee,
    /// Cycles path tracer
    Cycles,
}

impl RenderTarget {
    /// Whether an output node with this target satisfies `filter`.
    pub fn matches(self, filter: RenderTarget) -> bool {
        self == RenderTarget::All || filter == RenderTarget::All || self == filter
    }
}

/// Transform class of a mapping node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingType {
    /// Transform the UVs: scale, rotate, translate
    Point,
    /// Transform the texture: inverse of translate, rotate, scale
    Texture,
    /// Point without the translation
    Vector,
    /// Not meaningful for UVs; ignored
    Normal,
}

/// A shader node graph.
#[derive(Debug, Clone, Default)]
pub struct NodeTree {
    /// Nodes, addressed by index from `links`
    pub nodes: Vec<Node>,
    /// Links between node sockets
    pub links: Vec<Link>,
}

/// A single shader node.
#[derive(Debug, Clone)]
pub struct Node {
    /// Node name, unique within its tree
    pub name: String,
    /// Node payload
    pub kind: NodeKind,
}

/// The node kinds the resolver understands. Anything else in the host
/// graph is simply never linked into an interesting category.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Material output node
    OutputMaterial {
        /// Render engine this output targets
        target: RenderTarget,
    },
    /// Principled BSDF surface shader with its unconnected input values
    BsdfPrincipled {
        /// Base colour input default (RGBA)
        base_color: [f32; 4],
        /// Alpha input default
        alpha: f32,
        /// Emission input default (RGB)
        emission: [f32; 3],
        /// Roughness input default
        roughness: f32,
        /// Specular input default
        specular: f32,
    },
    /// Constant colour node
    Rgb {
        /// Output colour (RGBA)
        color: [f32; 4],
    },
    /// Constant scalar node
    Value {
        /// Output value
        value: f32,
    },
    /// Image texture node
    TexImage {
        /// Absolute path of the image file
        filepath: String,
    },
    /// UV mapping (deform) node
    Mapping {
        /// Transform class
        vector_type: MappingType,
        /// Translation input
        location: Vec3,
        /// Rotation input, XYZ Euler in radians
        rotation: Vec3,
        /// Non-uniform scale input
        scale: Vec3,
    },
    /// UV layer selector node
    UvMap {
        /// Name of the UV layer to sample
        uv_map: String,
    },
    /// Nested node group with its own tree
    Group {
        /// The group's internal tree
        tree: NodeTree,
    },
    /// A group tree's input pseudo-node
    GroupInput,
    /// A group tree's output pseudo-node
    GroupOutput,
}

/// A link between two node sockets, by node index and socket name.
#[derive(Debug, Clone)]
pub struct Link {
    /// Source node index
    pub from_node: usize,
    /// Source socket name
    pub from_socket: String,
    /// Destination node index
    pub to_node: usize,
    /// Destination socket name
    pub to_socket: String,
}

impl Link {
    /// Convenience constructor.
    pub fn new(from_node: usize, from_socket: &str, to_node: usize, to_socket: &str) -> Self {
        Self {
            from_node,
            from_socket: from_socket.into(),
            to_node,
            to_socket: to_socket.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum SocketKey {
    Surface,
    Bsdf,
    Alpha,
    Base,
    Emission,
    Roughness,
    Specular,
    Texture,
    Uv,
    UvMapOut,
    MappingOut,
    Color,
    Value,
    Group,
    Input,
    Output,
}

fn socket_key(node: &Node, socket: &str) -> Option<SocketKey> {
    Some(match (&node.kind, socket) {
        (NodeKind::Group { .. }, _) => SocketKey::Group,
        (NodeKind::GroupInput, _) => SocketKey::Input,
        (NodeKind::GroupOutput, _) => SocketKey::Output,
        (NodeKind::OutputMaterial { .. }, "Surface") => SocketKey::Surface,
        (NodeKind::BsdfPrincipled { .. }, "BSDF") => SocketKey::Bsdf,
        (NodeKind::BsdfPrincipled { .. }, "Alpha") => SocketKey::Alpha,
        (NodeKind::BsdfPrincipled { .. }, "Base Color") => SocketKey::Base,
        (NodeKind::BsdfPrincipled { .. }, "Emission") => SocketKey::Emission,
        (NodeKind::BsdfPrincipled { .. }, "Roughness") => SocketKey::Roughness,
        (NodeKind::BsdfPrincipled { .. }, "Specular") => SocketKey::Specular,
        (NodeKind::TexImage { .. }, "Color") => SocketKey::Texture,
        (NodeKind::TexImage { .. }, "Vector") => SocketKey::Uv,
        (NodeKind::UvMap { .. }, "UV") => SocketKey::UvMapOut,
        (NodeKind::Mapping { .. }, "Vector") => SocketKey::MappingOut,
        (NodeKind::Rgb { .. }, "Color") => SocketKey::Color,
        (NodeKind::Value { .. }, "Value") => SocketKey::Value,
        _ => return None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum LinkCategory {
    Bsdf,
    TextureBase,
    ColorBase,
    ColorEmission,
    ValueSpecular,
    ValueRoughness,
    ValueAlpha,
    Mapping,
    UvMap,
    Input,
    Output,
}

fn link_category(from: SocketKey, to: SocketKey) -> Option<LinkCategory> {
    Some(match (from, to) {
        (SocketKey::Bsdf, SocketKey::Surface) => LinkCategory::Bsdf,
        (SocketKey::Texture, SocketKey::Base) => LinkCategory::TextureBase,
        (SocketKey::Color, SocketKey::Base) => LinkCategory::ColorBase,
        (SocketKey::Color, SocketKey::Emission) => LinkCategory::ColorEmission,
        (SocketKey::Value, SocketKey::Specular) => LinkCategory::ValueSpecular,
        (SocketKey::Value, SocketKey::Roughness) => LinkCategory::ValueRoughness,
        (SocketKey::Value, SocketKey::Alpha) => LinkCategory::ValueAlpha,
        (SocketKey::MappingOut, SocketKey::Uv) => LinkCategory::Mapping,
        (SocketKey::UvMapOut, SocketKey::Uv) => LinkCategory::UvMap,
        (SocketKey::UvMapOut, SocketKey::MappingOut) => LinkCategory::UvMap,
        // Links into or out of a group tree keep their partial category
        // for later stitching.
        (SocketKey::Input, _) => LinkCategory::Input,
        (_, SocketKey::Output) => LinkCategory::Output,
        _ => return None,
    })
}

#[derive(Clone, Copy)]
struct ResolvedLink<'a> {
    from: &'a Node,
    from_socket: &'a str,
    to: &'a Node,
    to_socket: &'a str,
}

type LinkMap<'a> = HashMap<LinkCategory, Vec<ResolvedLink<'a>>>;

/// Flatten a tree (and any nested groups) into a link-category map.
/// Group boundaries disappear: each surviving link connects two real
/// nodes, possibly from different nesting levels.
fn collect_links(tree: &NodeTree) -> LinkMap<'_> {
    let mut links: LinkMap = HashMap::new();
    let mut groups: HashMap<usize, (Vec<ResolvedLink>, Vec<ResolvedLink>)> = HashMap::new();

    for link in &tree.links {
        let (Some(from_node), Some(to_node)) =
            (tree.nodes.get(link.from_node), tree.nodes.get(link.to_node))
        else {
            continue;
        };
        let mut from = from_node;
        let mut from_socket = link.from_socket.as_str();
        let mut to = to_node;
        let mut to_socket = link.to_socket.as_str();

        let (Some(mut from_key), Some(mut to_key)) =
            (socket_key(from, from_socket), socket_key(to, to_socket))
        else {
            continue;
        };

        // A link from a group node really comes from whatever feeds the
        // group's output socket of the same name on the inside.
        if from_key == SocketKey::Group {
            let (_, outputs) = group_links(from, link.from_node, &mut groups, &mut links);
            let Some(inner) = outputs.iter().find(|l| l.to_socket == from_socket) else {
                continue;
            };
            from = inner.from;
            from_socket = inner.from_socket;
            let Some(key) = socket_key(from, from_socket) else {
                continue;
            };
            from_key = key;
        }

        // Symmetrically, a link to a group node really targets whatever
        // the group's matching input socket feeds on the inside.
        if to_key == SocketKey::Group {
            let (inputs, _) = group_links(to, link.to_node, &mut groups, &mut links);
            let Some(inner) = inputs.iter().find(|l| l.from_socket == to_socket) else {
                continue;
            };
            to = inner.to;
            to_socket = inner.to_socket;
            let Some(key) = socket_key(to, to_socket) else {
                continue;
            };
            to_key = key;
        }

        let Some(category) = link_category(from_key, to_key) else {
            continue;
        };
        links.entry(category).or_default().push(ResolvedLink {
            from,
            from_socket,
            to,
            to_socket,
        });
    }

    links
}

/// Resolve a group node's internal tree once, splicing its interior
/// categories into `links` and returning its boundary partials.
fn group_links<'a>(
    node: &'a Node,
    index: usize,
    groups: &mut HashMap<usize, (Vec<ResolvedLink<'a>>, Vec<ResolvedLink<'a>>)>,
    links: &mut LinkMap<'a>,
) -> (Vec<ResolvedLink<'a>>, Vec<ResolvedLink<'a>>) {
    if let Some(cached) = groups.get(&index) {
        return cached.clone();
    }
    let NodeKind::Group { tree } = &node.kind else {
        return (Vec::new(), Vec::new());
    };
    let mut sub = collect_links(tree);
    let inputs = sub.remove(&LinkCategory::Input).unwrap_or_default();
    let outputs = sub.remove(&LinkCategory::Output).unwrap_or_default();
    for (category, resolved) in sub {
        links.entry(category).or_default().extend(resolved);
    }
    groups.insert(index, (inputs.clone(), outputs.clone()));
    (inputs, outputs)
}

fn find_from<'a>(links: &LinkMap<'a>, category: LinkCategory, to: &Node) -> Option<&'a Node> {
    links
        .get(&category)?
        .iter()
        .find(|l| std::ptr::eq(l.to, to))
        .map(|l| l.from)
}

fn rgb_output(node: &Node) -> Option<[f32; 3]> {
    match node.kind {
        NodeKind::Rgb { color } => Some([color[0], color[1], color[2]]),
        _ => None,
    }
}

fn value_output(node: &Node) -> Option<f32> {
    match node.kind {
        NodeKind::Value { value } => Some(value),
        _ => None,
    }
}

/// A source material resolved to concrete export values.
///
/// Resolution happens once per distinct source material; the assembler
/// caches instances and reuses them for every triangle that references
/// the material.
#[derive(Debug, Clone)]
pub struct ResolvedMaterial {
    /// Diffuse colour (RGBA)
    pub diffuse: [f32; 4],
    /// Specular colour (RGB)
    pub specular: [f32; 3],
    /// Emissive colour (RGB)
    pub emissive: [f32; 3],
    /// Specular power, `1000 - roughness * 1000`
    pub power: f32,
    /// Texture path relative to the texture lookup root
    pub texture: String,
    /// Name of the UV layer the shader samples, empty for none
    pub uv_map: String,
    uv_matrix: Mat4,
}

impl ResolvedMaterial {
    /// Apply the material's UV deformation to one coordinate pair.
    ///
    /// The composed matrix includes both the mapping node transform and
    /// the flip from bottom-left-origin to top-left-origin UV space.
    /// The mapping node performs a 3D transformation, so the coordinate
    /// is lifted to homogeneous 4D and projected back.
    pub fn deform_uv(&self, uv: Vec2) -> Vec2 {
        let v = self.uv_matrix * Vec4::new(uv.x, uv.y, 0.0, 1.0);
        Vec2::new(v.x, v.y)
    }

    /// Convert to the codec's material record.
    pub fn to_material(&self) -> o3d_mesh::Material {
        o3d_mesh::Material {
            diffuse: self.diffuse,
            specular: self.specular,
            emissive: self.emissive,
            power: self.power,
            texture: self.texture.clone(),
        }
    }
}

/// Reflection about v = 0.5, converting bottom-left-origin UV space to
/// the game's top-left-origin space.
fn uv_flip() -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)) * Mat4::from_scale(Vec3::new(1.0, -1.0, 1.0))
}

fn mapping_matrix(node: &Node) -> Mat4 {
    let NodeKind::Mapping {
        vector_type,
        location,
        rotation,
        scale,
    } = &node.kind
    else {
        return Mat4::IDENTITY;
    };
    let loc = Mat4::from_translation(*location);
    let rot = euler_xyz(*rotation);
    let sca = Mat4::from_scale(*scale);
    match vector_type {
        MappingType::Point => sca * rot * loc,
        MappingType::Texture => invert_or_identity(loc * rot * sca),
        MappingType::Vector => sca * rot,
        MappingType::Normal => Mat4::IDENTITY,
    }
}

/// Resolve a path to the relative texture string stored in the file:
/// the path below the deepest ancestor directory literally named
/// `texture`, or just the file name when no such ancestor exists.
/// Output uses Windows path separators, matching the consuming game.
pub fn texture_path(filepath: &str) -> String {
    let segments: Vec<&str> = filepath
        .split(['\\', '/'])
        .filter(|s| !s.is_empty())
        .collect();
    let Some((file, dirs)) = segments.split_last() else {
        return String::new();
    };
    match dirs.iter().rposition(|dir| *dir == "texture") {
        Some(anchor) => segments[anchor + 1..].join("\\"),
        None => (*file).to_string(),
    }
}

/// Resolve a source material (or the absence of one) to concrete export
/// values.
///
/// The output node is located by exact `output_name` match first,
/// falling back to the first output targeting `target`. Without a
/// usable output or BSDF the material's legacy surface properties are
/// used; without a material, the context-free defaults.
pub fn resolve_material(
    material: Option<&SourceMaterial>,
    target: RenderTarget,
    output_name: &str,
) -> ResolvedMaterial {
    let Some(material) = material else {
        return ResolvedMaterial {
            diffuse: [1.0, 1.0, 1.0, 1.0],
            specular: [0.5, 0.5, 0.5],
            emissive: [0.0, 0.0, 0.0],
            power: 1000.0,
            texture: String::new(),
            uv_map: String::new(),
            uv_matrix: uv_flip(),
        };
    };
    let Some(tree) = &material.node_tree else {
        return legacy_material(material);
    };

    // Locate the output node: exact name match wins, but only if the
    // named node actually is a material output.
    let output = tree
        .nodes
        .iter()
        .find(|n| n.name == output_name && matches!(n.kind, NodeKind::OutputMaterial { .. }))
        .or_else(|| {
            tree.nodes.iter().find(
                |n| matches!(n.kind, NodeKind::OutputMaterial { target: t } if t.matches(target)),
            )
        });
    let Some(output) = output else {
        return legacy_material(material);
    };

    let links = collect_links(tree);
    let Some(bsdf) = find_from(&links, LinkCategory::Bsdf, output) else {
        return legacy_material(material);
    };
    let NodeKind::BsdfPrincipled {
        base_color,
        alpha,
        emission,
        roughness,
        specular,
    } = &bsdf.kind
    else {
        return legacy_material(material);
    };

    let color_emission = find_from(&links, LinkCategory::ColorEmission, bsdf);
    let value_specular = find_from(&links, LinkCategory::ValueSpecular, bsdf);
    let value_roughness = find_from(&links, LinkCategory::ValueRoughness, bsdf);
    let value_alpha = find_from(&links, LinkCategory::ValueAlpha, bsdf);

    // A base colour node and an image node are mutually exclusive per
    // material; colour wins.
    let color_base = find_from(&links, LinkCategory::ColorBase, bsdf);
    let (image, mapping, uvmap) = if color_base.is_some() {
        (None, None, None)
    } else {
        match find_from(&links, LinkCategory::TextureBase, bsdf) {
            None => (None, None, None),
            Some(image) => {
                let mapping = find_from(&links, LinkCategory::Mapping, image);
                let uvmap = find_from(&links, LinkCategory::UvMap, mapping.unwrap_or(image));
                (Some(image), mapping, uvmap)
            }
        }
    };

    let rgb = color_base
        .and_then(rgb_output)
        .unwrap_or([base_color[0], base_color[1], base_color[2]]);
    let a = value_alpha.and_then(value_output).unwrap_or(*alpha);
    let s = value_specular.and_then(value_output).unwrap_or(*specular);
    let r = value_roughness.and_then(value_output).unwrap_or(*roughness);

    ResolvedMaterial {
        diffuse: [rgb[0], rgb[1], rgb[2], a],
        specular: [s, s, s],
        emissive: color_emission.and_then(rgb_output).unwrap_or(*emission),
        power: 1000.0 - r * 1000.0,
        texture: image
            .and_then(|n| match &n.kind {
                NodeKind::TexImage { filepath } => Some(texture_path(filepath)),
                _ => None,
            })
            .unwrap_or_default(),
        uv_map: uvmap
            .and_then(|n| match &n.kind {
                NodeKind::UvMap { uv_map } => Some(uv_map.clone()),
                _ => None,
            })
            .unwrap_or_default(),
        uv_matrix: uv_flip() * mapping.map(mapping_matrix).unwrap_or(Mat4::IDENTITY),
    }
}

/// Fallbacks for a material whose shader graph is missing or unusable:
/// the legacy surface properties. Note the asymmetry with the
/// no-material case, which uses a 50% grey specular instead of the
/// legacy specular colour; this matches the consuming game's historic
/// material defaults and is intentional.
fn legacy_material(material: &SourceMaterial) -> ResolvedMaterial {
    ResolvedMaterial {
        diffuse: material.diffuse_color,
        specular: material.specular_color,
        emissive: [0.0, 0.0, 0.0],
        power: 1000.0 - material.roughness * 1000.0,
        texture: String::new(),
        uv_map: String::new(),
        uv_matrix: uv_flip(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, kind: NodeKind) -> Node {
        Node {
            name: name.into(),
            kind,
        }
    }

    fn bsdf_defaults() -> NodeKind {
        NodeKind::BsdfPrincipled {
            base_color: [0.8, 0.8, 0.8, 1.0],
            alpha: 1.0,
            emission: [0.0, 0.0, 0.0],
            roughness: 0.5,
            specular: 0.5,
        }
    }

    fn material_with_tree(tree: NodeTree) -> SourceMaterial {
        SourceMaterial {
            name: "mat".into(),
            diffuse_color: [0.2, 0.3, 0.4, 1.0],
            specular_color: [1.0, 1.0, 1.0],
            roughness: 0.25,
            node_tree: Some(tree),
        }
    }

    fn simple_tree() -> NodeTree {
        NodeTree {
            nodes: vec![
                node(
                    "Export",
                    NodeKind::OutputMaterial {
                        target: RenderTarget::All,
                    },
                ),
                node("Principled BSDF", bsdf_defaults()),
            ],
            links: vec![Link::new(1, "BSDF", 0, "Surface")],
        }
    }

    #[test]
    fn test_no_material_defaults() {
        let resolved = resolve_material(None, RenderTarget::All, "Export");
        assert_eq!(resolved.diffuse, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(resolved.specular, [0.5, 0.5, 0.5]);
        assert_eq!(resolved.emissive, [0.0, 0.0, 0.0]);
        assert_eq!(resolved.power, 1000.0);
        assert!(resolved.texture.is_empty());
        assert!(resolved.uv_map.is_empty());
    }

    #[test]
    fn test_nodeless_material_uses_legacy_properties() {
        let material = SourceMaterial {
            name: "legacy".into(),
            diffuse_color: [0.1, 0.2, 0.3, 0.9],
            specular_color: [0.6, 0.7, 0.8],
            roughness: 0.25,
            node_tree: None,
        };
        let resolved = resolve_material(Some(&material), RenderTarget::All, "Export");
        assert_eq!(resolved.diffuse, [0.1, 0.2, 0.3, 0.9]);
        assert_eq!(resolved.specular, [0.6, 0.7, 0.8]);
        assert_eq!(resolved.power, 750.0);
    }

    #[test]
    fn test_specular_asymmetry_between_no_material_and_no_shader() {
        // No material at all: 50% grey.
        let none = resolve_material(None, RenderTarget::All, "Export");
        assert_eq!(none.specular, [0.5, 0.5, 0.5]);
        // Material without a usable shader: legacy specular colour.
        let material = material_with_tree(NodeTree::default());
        let legacy = resolve_material(Some(&material), RenderTarget::All, "Export");
        assert_eq!(legacy.specular, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_bsdf_input_defaults() {
        let material = material_with_tree(simple_tree());
        let resolved = resolve_material(Some(&material), RenderTarget::All, "Export");
        assert_eq!(resolved.diffuse, [0.8, 0.8, 0.8, 1.0]);
        assert_eq!(resolved.specular, [0.5, 0.5, 0.5]);
        assert_eq!(resolved.emissive, [0.0, 0.0, 0.0]);
        assert_eq!(resolved.power, 500.0);
    }

    #[test]
    fn test_output_node_found_by_name_before_target() {
        let mut tree = simple_tree();
        // A second output with a different name targets Cycles; the
        // named node still wins under any filter.
        tree.nodes.push(node(
            "Material Output",
            NodeKind::OutputMaterial {
                target: RenderTarget::Cycles,
            },
        ));
        let material = material_with_tree(tree);
        let resolved = resolve_material(Some(&material), RenderTarget::Cycles, "Export");
        assert_eq!(resolved.power, 500.0);
    }

    #[test]
    fn test_misnamed_node_of_wrong_kind_falls_back_to_target() {
        let mut tree = simple_tree();
        tree.nodes[0].name = "Material Output".into();
        // A value node that happens to carry the requested name.
        tree.nodes
            .push(node("Export", NodeKind::Value { value: 1.0 }));
        let material = material_with_tree(tree);
        let resolved = resolve_material(Some(&material), RenderTarget::All, "Export");
        // The real output is found via the target fallback.
        assert_eq!(resolved.power, 500.0);
    }

    #[test]
    fn test_target_filter_mismatch_uses_legacy() {
        let mut tree = simple_tree();
        tree.nodes[0] = node(
            "Eevee Out",
            NodeKind::OutputMaterial {
                target: RenderTarget::Eevee,
            },
        );
        let material = material_with_tree(tree);
        let mismatch = resolve_material(Some(&material), RenderTarget::Cycles, "Export");
        assert_eq!(mismatch.power, 750.0); // legacy roughness 0.25
        let any = resolve_material(Some(&material), RenderTarget::All, "Export");
        assert_eq!(any.power, 500.0);
    }

    #[test]
    fn test_value_nodes_override_bsdf_inputs() {
        let mut tree = simple_tree();
        tree.nodes
            .push(node("Rough", NodeKind::Value { value: 1.0 }));
        tree.nodes
            .push(node("Spec", NodeKind::Value { value: 0.25 }));
        tree.nodes
            .push(node("Alpha", NodeKind::Value { value: 0.5 }));
        tree.links.push(Link::new(2, "Value", 1, "Roughness"));
        tree.links.push(Link::new(3, "Value", 1, "Specular"));
        tree.links.push(Link::new(4, "Value", 1, "Alpha"));
        let material = material_with_tree(tree);
        let resolved = resolve_material(Some(&material), RenderTarget::All, "Export");
        assert_eq!(resolved.power, 0.0);
        assert_eq!(resolved.specular, [0.25, 0.25, 0.25]);
        assert_eq!(resolved.diffuse[3], 0.5);
    }

    #[test]
    fn test_emission_color_node() {
        let mut tree = simple_tree();
        tree.nodes.push(node(
            "Glow",
            NodeKind::Rgb {
                color: [1.0, 0.5, 0.0, 1.0],
            },
        ));
        tree.links.push(Link::new(2, "Color", 1, "Emission"));
        let material = material_with_tree(tree);
        let resolved = resolve_material(Some(&material), RenderTarget::All, "Export");
        assert_eq!(resolved.emissive, [1.0, 0.5, 0.0]);
    }

    #[test]
    fn test_base_color_node_wins_over_texture() {
        let mut tree = simple_tree();
        tree.nodes.push(node(
            "Base",
            NodeKind::Rgb {
                color: [0.9, 0.1, 0.1, 1.0],
            },
        ));
        tree.nodes.push(node(
            "Image",
            NodeKind::TexImage {
                filepath: "C:\\game\\texture\\body.png".into(),
            },
        ));
        tree.links.push(Link::new(2, "Color", 1, "Base Color"));
        tree.links.push(Link::new(3, "Color", 1, "Base Color"));
        let material = material_with_tree(tree);
        let resolved = resolve_material(Some(&material), RenderTarget::All, "Export");
        assert_eq!(resolved.diffuse, [0.9, 0.1, 0.1, 1.0]);
        assert!(resolved.texture.is_empty());
    }

    #[test]
    fn test_texture_and_uv_map_chain() {
        let mut tree = simple_tree();
        tree.nodes.push(node(
            "Image",
            NodeKind::TexImage {
                filepath: "C:\\omsi\\vehicles\\bus\\texture\\body\\side.png".into(),
            },
        ));
        tree.nodes.push(node(
            "UVMap",
            NodeKind::UvMap {
                uv_map: "Lightmap".into(),
            },
        ));
        tree.links.push(Link::new(2, "Color", 1, "Base Color"));
        tree.links.push(Link::new(3, "UV", 2, "Vector"));
        let material = material_with_tree(tree);
        let resolved = resolve_material(Some(&material), RenderTarget::All, "Export");
        assert_eq!(resolved.texture, "body\\side.png");
        assert_eq!(resolved.uv_map, "Lightmap");
    }

    #[test]
    fn test_uv_map_through_mapping_node() {
        let mut tree = simple_tree();
        tree.nodes.push(node(
            "Image",
            NodeKind::TexImage {
                filepath: String::new(),
            },
        ));
        tree.nodes.push(node(
            "Mapping",
            NodeKind::Mapping {
                vector_type: MappingType::Point,
                location: Vec3::ZERO,
                rotation: Vec3::ZERO,
                scale: Vec3::ONE,
            },
        ));
        tree.nodes.push(node(
            "UVMap",
            NodeKind::UvMap {
                uv_map: "Detail".into(),
            },
        ));
        tree.links.push(Link::new(2, "Color", 1, "Base Color"));
        tree.links.push(Link::new(3, "Vector", 2, "Vector"));
        tree.links.push(Link::new(4, "UV", 3, "Vector"));
        let material = material_with_tree(tree);
        let resolved = resolve_material(Some(&material), RenderTarget::All, "Export");
        assert_eq!(resolved.uv_map, "Detail");
    }

    #[test]
    fn test_group_output_stitching() {
        let sub = NodeTree {
            nodes: vec![
                node(
                    "Inner RGB",
                    NodeKind::Rgb {
                        color: [0.0, 0.0, 1.0, 1.0],
                    },
                ),
                node("Group Output", NodeKind::GroupOutput),
            ],
            links: vec![Link::new(0, "Color", 1, "Color")],
        };
        let mut tree = simple_tree();
        tree.nodes.push(node("Colours", NodeKind::Group { tree: sub }));
        tree.links.push(Link::new(2, "Color", 1, "Base Color"));
        let material = material_with_tree(tree);
        let resolved = resolve_material(Some(&material), RenderTarget::All, "Export");
        assert_eq!(resolved.diffuse, [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_group_input_stitching() {
        // A texture node inside a group; the UV map node outside feeds
        // the group's Vector input.
        let sub = NodeTree {
            nodes: vec![
                node("Group Input", NodeKind::GroupInput),
                node(
                    "Inner Image",
                    NodeKind::TexImage {
                        filepath: "C:\\texture\\inner.png".into(),
                    },
                ),
                node("Group Output", NodeKind::GroupOutput),
            ],
            links: vec![
                Link::new(0, "Vector", 1, "Vector"),
                Link::new(1, "Color", 2, "Color"),
            ],
        };
        let mut tree = simple_tree();
        tree.nodes.push(node("Textures", NodeKind::Group { tree: sub }));
        tree.nodes.push(node(
            "UVMap",
            NodeKind::UvMap {
                uv_map: "Baked".into(),
            },
        ));
        tree.links.push(Link::new(2, "Color", 1, "Base Color"));
        tree.links.push(Link::new(3, "UV", 2, "Vector"));
        let material = material_with_tree(tree);
        let resolved = resolve_material(Some(&material), RenderTarget::All, "Export");
        assert_eq!(resolved.texture, "inner.png");
        assert_eq!(resolved.uv_map, "Baked");
    }

    #[test]
    fn test_uv_flip_reflects_v_about_half() {
        let resolved = resolve_material(None, RenderTarget::All, "Export");
        let uv = resolved.deform_uv(Vec2::new(0.25, 0.25));
        assert!((uv.x - 0.25).abs() < 1e-6);
        assert!((uv.y - 0.75).abs() < 1e-6);
    }

    fn mapping_material(vector_type: MappingType, location: Vec3, scale: Vec3) -> SourceMaterial {
        let mut tree = simple_tree();
        tree.nodes.push(node(
            "Image",
            NodeKind::TexImage {
                filepath: String::new(),
            },
        ));
        tree.nodes.push(node(
            "Mapping",
            NodeKind::Mapping {
                vector_type,
                location,
                rotation: Vec3::ZERO,
                scale,
            },
        ));
        tree.links.push(Link::new(2, "Color", 1, "Base Color"));
        tree.links.push(Link::new(3, "Vector", 2, "Vector"));
        material_with_tree(tree)
    }

    #[test]
    fn test_point_mapping_translates_uvs() {
        let material = mapping_material(MappingType::Point, Vec3::new(0.5, 0.0, 0.0), Vec3::ONE);
        let resolved = resolve_material(Some(&material), RenderTarget::All, "Export");
        let uv = resolved.deform_uv(Vec2::ZERO);
        assert!((uv.x - 0.5).abs() < 1e-6);
        assert!((uv.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_texture_mapping_is_inverse() {
        let material = mapping_material(MappingType::Texture, Vec3::ZERO, Vec3::new(2.0, 2.0, 1.0));
        let resolved = resolve_material(Some(&material), RenderTarget::All, "Export");
        let uv = resolved.deform_uv(Vec2::new(0.5, 0.25));
        assert!((uv.x - 0.25).abs() < 1e-6);
        assert!((uv.y - 0.875).abs() < 1e-6);
    }

    #[test]
    fn test_vector_mapping_ignores_translation() {
        let material = mapping_material(MappingType::Vector, Vec3::new(0.5, 0.5, 0.0), Vec3::ONE);
        let resolved = resolve_material(Some(&material), RenderTarget::All, "Export");
        let uv = resolved.deform_uv(Vec2::new(0.25, 0.25));
        assert!((uv.x - 0.25).abs() < 1e-6);
        assert!((uv.y - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_texture_path_with_texture_ancestor() {
        assert_eq!(
            texture_path("C:\\omsi\\a\\texture\\b\\c.png"),
            "b\\c.png"
        );
    }

    #[test]
    fn test_texture_path_without_texture_ancestor() {
        assert_eq!(texture_path("C:\\omsi\\a\\b\\c.png"), "c.png");
    }

    #[test]
    fn test_texture_path_nested_anchors_use_deepest() {
        assert_eq!(
            texture_path("C:\\texture\\x\\texture\\y\\c.png"),
            "y\\c.png"
        );
    }

    #[test]
    fn test_texture_path_accepts_forward_slashes() {
        assert_eq!(texture_path("/home/user/texture/b/c.png"), "b\\c.png");
    }

    #[test]
    fn test_texture_named_file_is_not_an_anchor() {
        // Only ancestor directories count, not the file itself.
        assert_eq!(texture_path("C:\\a\\b\\texture"), "texture");
    }
}
