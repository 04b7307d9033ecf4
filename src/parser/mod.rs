//! XML parsing for 3MF model files
//!
//! The parser reads the subset of the core specification and the materials
//! extension that the scene builder consumes. Elements it does not know are
//! skipped, so documents using other extensions still load.

mod core;
mod material;

use crate::error::{Error, Result};
use crate::model::*;
use crate::opc::Package;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use std::io::{Read, Seek};

pub use core::{parse_build_item, parse_component, parse_object, parse_triangle, parse_vertex};
pub use material::{
    parse_base_element, parse_color_element, parse_metallic_element, parse_specular_element,
};

/// Default buffer capacity for XML parsing (4KB)
const XML_BUFFER_CAPACITY: usize = 4096;

/// Parse a 3MF file from a reader
///
/// Opens the package, locates the model part through the package
/// relationships and parses it.
///
/// # Example
///
/// ```no_run
/// use threemf_scene::parser::parse_3mf;
/// use std::fs::File;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let model = parse_3mf(File::open("model.3mf")?)?;
/// println!("{} build items", model.build.items.len());
/// # Ok(())
/// # }
/// ```
pub fn parse_3mf<R: Read + Seek>(reader: R) -> Result<Model> {
    let mut package = Package::open(reader)?;
    let model_xml = package.model_xml()?;
    parse_model_xml(&model_xml)
}

/// Get the local name from a potentially namespaced XML name
///
/// - `"m:colorgroup"` returns `"colorgroup"`
/// - `"object"` returns `"object"`
pub(crate) fn get_local_name(name_str: &str) -> &str {
    match name_str.rfind(':') {
        Some(pos) => &name_str[pos + 1..],
        None => name_str,
    }
}

/// Parse attributes from an XML element
///
/// Values are unescaped, keys keep their namespace prefix.
pub(crate) fn parse_attributes(e: &BytesStart) -> Result<HashMap<String, String>> {
    let mut attrs = HashMap::with_capacity(8);

    for attr in e.attributes() {
        let attr = attr?;
        let key =
            std::str::from_utf8(attr.key.as_ref()).map_err(|e| Error::InvalidXml(e.to_string()))?;
        let raw = std::str::from_utf8(&attr.value).map_err(|e| Error::InvalidXml(e.to_string()))?;
        let value = quick_xml::escape::unescape(raw)
            .map_err(|e| Error::XmlAttr(format!("Attribute '{}': {}", key, e)))?;

        attrs.insert(key.to_string(), value.into_owned());
    }

    Ok(attrs)
}

/// Parse a numeric attribute, naming the element and attribute on failure
pub(crate) fn parse_number<T: std::str::FromStr>(
    element: &str,
    attribute: &str,
    value: &str,
) -> Result<T> {
    value.trim().parse::<T>().map_err(|_| {
        Error::parse_error_with_context(
            &format!("{}@{}", element, attribute),
            value,
            std::any::type_name::<T>(),
        )
    })
}

/// Fetch and parse a required numeric attribute
pub(crate) fn required_number<T: std::str::FromStr>(
    attrs: &HashMap<String, String>,
    element: &str,
    attribute: &str,
) -> Result<T> {
    let value = attrs
        .get(attribute)
        .ok_or_else(|| Error::missing_attribute(element, attribute))?;
    parse_number(element, attribute, value)
}

/// Fetch and parse an optional numeric attribute
pub(crate) fn optional_number<T: std::str::FromStr>(
    attrs: &HashMap<String, String>,
    element: &str,
    attribute: &str,
) -> Result<Option<T>> {
    attrs
        .get(attribute)
        .map(|value| parse_number(element, attribute, value))
        .transpose()
}

fn element_local_name(e: &BytesStart) -> Result<String> {
    let name = e.name();
    let name_str =
        std::str::from_utf8(name.as_ref()).map_err(|e| Error::InvalidXml(e.to_string()))?;
    Ok(get_local_name(name_str).to_string())
}

/// In-progress metadata element
struct PendingMetadata {
    name: String,
    preserve: Option<bool>,
    value: String,
}

/// Mutable state of one pass over a model document
#[derive(Default)]
struct ModelParser {
    model: Model,
    namespaces: HashMap<String, String>,
    in_resources: bool,
    in_build: bool,
    object: Option<Object>,
    mesh: Option<Mesh>,
    components: Option<Vec<Component>>,
    color_group: Option<ColorGroup>,
    base_group: Option<BaseMaterialGroup>,
    metallic_group: Option<MetallicDisplayProperties>,
    specular_group: Option<SpecularDisplayProperties>,
    metadata: Option<PendingMetadata>,
}

impl ModelParser {
    fn start(&mut self, local_name: &str, e: &BytesStart) -> Result<()> {
        match local_name {
            "model" => self.parse_model_attributes(e)?,
            "metadata" if !self.in_resources && !self.in_build => {
                let attrs = parse_attributes(e)?;
                let name = attrs
                    .get("name")
                    .ok_or_else(|| Error::missing_attribute("metadata", "name"))?;
                let preserve = match attrs.get("preserve").map(String::as_str) {
                    None => None,
                    Some("1") | Some("true") => Some(true),
                    Some("0") | Some("false") => Some(false),
                    Some(other) => {
                        return Err(Error::invalid_xml_element(
                            "metadata",
                            &format!("invalid preserve value '{}'", other),
                        ));
                    }
                };
                self.metadata = Some(PendingMetadata {
                    name: name.clone(),
                    preserve,
                    value: String::new(),
                });
            }
            "resources" => self.in_resources = true,
            "build" => self.in_build = true,
            "object" if self.in_resources => {
                self.object = Some(parse_object(e)?);
            }
            "mesh" if self.object.is_some() => {
                self.mesh = Some(Mesh::new());
            }
            "vertex" => {
                if let Some(mesh) = self.mesh.as_mut() {
                    mesh.vertices.push(parse_vertex(e)?);
                }
            }
            "triangle" => {
                if let Some(mesh) = self.mesh.as_mut() {
                    mesh.triangles.push(parse_triangle(e)?);
                }
            }
            "components" if self.object.is_some() => {
                self.components = Some(Vec::new());
            }
            "component" => {
                if let Some(components) = self.components.as_mut() {
                    components.push(parse_component(e)?);
                }
            }
            "colorgroup" if self.in_resources => {
                let attrs = parse_attributes(e)?;
                let mut group = ColorGroup::new(required_number(&attrs, "colorgroup", "id")?);
                group.display_properties_id =
                    optional_number(&attrs, "colorgroup", "displaypropertiesid")?;
                self.color_group = Some(group);
            }
            "color" => {
                if let Some(group) = self.color_group.as_mut() {
                    group.colors.push(parse_color_element(e)?);
                }
            }
            "basematerials" if self.in_resources => {
                let attrs = parse_attributes(e)?;
                let mut group =
                    BaseMaterialGroup::new(required_number(&attrs, "basematerials", "id")?);
                group.display_properties_id =
                    optional_number(&attrs, "basematerials", "displaypropertiesid")?;
                self.base_group = Some(group);
            }
            "base" => {
                if let Some(group) = self.base_group.as_mut() {
                    group.materials.push(parse_base_element(e)?);
                }
            }
            "pbmetallicdisplayproperties" if self.in_resources => {
                let attrs = parse_attributes(e)?;
                self.metallic_group = Some(MetallicDisplayProperties::new(required_number(
                    &attrs,
                    "pbmetallicdisplayproperties",
                    "id",
                )?));
            }
            "pbmetallic" => {
                if let Some(group) = self.metallic_group.as_mut() {
                    group.metallics.push(parse_metallic_element(e)?);
                }
            }
            "pbspeculardisplayproperties" if self.in_resources => {
                let attrs = parse_attributes(e)?;
                self.specular_group = Some(SpecularDisplayProperties::new(required_number(
                    &attrs,
                    "pbspeculardisplayproperties",
                    "id",
                )?));
            }
            "pbspecular" => {
                if let Some(group) = self.specular_group.as_mut() {
                    group.speculars.push(parse_specular_element(e)?);
                }
            }
            "item" if self.in_build => {
                let item = parse_build_item(e, &self.namespaces)?;
                self.model.build.items.push(item);
            }
            _ => {}
        }

        Ok(())
    }

    fn end(&mut self, local_name: &str) -> Result<()> {
        match local_name {
            "metadata" => {
                if let Some(pending) = self.metadata.take() {
                    let mut entry = Metadata::new(&pending.name, pending.value.trim());
                    entry.preserve = pending.preserve;
                    self.model.metadata.push(entry);
                }
            }
            "resources" => self.in_resources = false,
            "build" => self.in_build = false,
            "mesh" => {
                if let (Some(mesh), Some(object)) = (self.mesh.take(), self.object.as_mut()) {
                    if let Some((triangle, vertex)) = mesh.first_invalid_triangle() {
                        return Err(Error::InvalidMesh(format!(
                            "Object {}: triangle {} references vertex {} but the mesh has {} vertices",
                            object.id,
                            triangle,
                            vertex,
                            mesh.vertices.len()
                        )));
                    }
                    object.content = ObjectContent::Mesh(mesh);
                }
            }
            "components" => {
                if let (Some(components), Some(object)) =
                    (self.components.take(), self.object.as_mut())
                {
                    object.content = ObjectContent::Components(components);
                }
            }
            "object" => {
                if let Some(object) = self.object.take() {
                    self.model.resources.objects.push(object);
                }
            }
            "colorgroup" => {
                if let Some(group) = self.color_group.take() {
                    self.model.resources.color_groups.push(group);
                }
            }
            "basematerials" => {
                if let Some(group) = self.base_group.take() {
                    self.model.resources.base_material_groups.push(group);
                }
            }
            "pbmetallicdisplayproperties" => {
                if let Some(group) = self.metallic_group.take() {
                    self.model.resources.metallic_display_properties.push(group);
                }
            }
            "pbspeculardisplayproperties" => {
                if let Some(group) = self.specular_group.take() {
                    self.model.resources.specular_display_properties.push(group);
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn parse_model_attributes(&mut self, e: &BytesStart) -> Result<()> {
        for (key, value) in parse_attributes(e)? {
            if key == "unit" {
                let unit = Unit::from_xml_value(&value).ok_or_else(|| {
                    Error::InvalidXml(format!(
                        "Invalid unit '{}'. Must be one of: micron, millimeter, centimeter, inch, foot, meter",
                        value
                    ))
                })?;
                self.model.unit = Some(unit);
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                self.namespaces.insert(prefix.to_string(), value);
            }
        }
        Ok(())
    }

    fn push_text(&mut self, text: &str) {
        if let Some(pending) = self.metadata.as_mut() {
            pending.value.push_str(text);
        }
    }
}

/// Parse the 3D model XML content
///
/// Note: This function is public to enable integration testing against inline
/// XML fixtures; production code should go through [`parse_3mf`].
#[doc(hidden)]
pub fn parse_model_xml(xml: &str) -> Result<Model> {
    // DTD declarations can lead to XXE (XML External Entity) attacks
    let check_len = xml.len().min(2000);
    let xml_start = xml.get(..check_len).unwrap_or(xml);
    if xml_start.to_ascii_lowercase().contains("<!doctype") {
        return Err(Error::InvalidXml(
            "DTD declarations are not allowed in 3MF files for security reasons".to_string(),
        ));
    }

    // Text is only kept for metadata values, which are trimmed as a whole so
    // that entity references inside them keep their surrounding spaces
    let mut reader = Reader::from_str(xml);

    let mut state = ModelParser::default();
    let mut buf = Vec::with_capacity(XML_BUFFER_CAPACITY);

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::DocType(_)) => {
                return Err(Error::InvalidXml(
                    "DTD declarations are not allowed in 3MF files for security reasons"
                        .to_string(),
                ));
            }
            Ok(Event::Start(ref e)) => {
                let local_name = element_local_name(e)?;
                state.start(&local_name, e)?;
            }
            Ok(Event::Empty(ref e)) => {
                let local_name = element_local_name(e)?;
                state.start(&local_name, e)?;
                state.end(&local_name)?;
            }
            Ok(Event::End(ref e)) => {
                let name = e.name();
                let name_str = std::str::from_utf8(name.as_ref())
                    .map_err(|e| Error::InvalidXml(e.to_string()))?;
                state.end(get_local_name(name_str))?;
            }
            Ok(Event::Text(ref t)) => {
                let text = t.decode().map_err(|e| Error::InvalidXml(e.to_string()))?;
                state.push_text(&text);
            }
            Ok(Event::CData(ref t)) => {
                state.push_text(&String::from_utf8_lossy(t));
            }
            Ok(Event::GeneralRef(ref r)) => {
                if let Some(ch) = r.resolve_char_ref()? {
                    state.push_text(ch.encode_utf8(&mut [0; 4]));
                } else {
                    let entity = r.decode().map_err(|e| Error::InvalidXml(e.to_string()))?;
                    let resolved = quick_xml::escape::resolve_predefined_entity(&entity)
                        .ok_or_else(|| {
                            Error::InvalidXml(format!("Unknown entity reference '&{};'", entity))
                        })?;
                    state.push_text(resolved);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(state.model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_model() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<model unit="millimeter" xmlns="http://schemas.microsoft.com/3dmanufacturing/core/2015/02">
  <resources>
    <object id="1">
      <mesh>
        <vertices>
          <vertex x="0" y="0" z="0"/>
          <vertex x="1" y="0" z="0"/>
          <vertex x="0" y="1" z="0"/>
        </vertices>
        <triangles>
          <triangle v1="0" v2="1" v3="2"/>
        </triangles>
      </mesh>
    </object>
  </resources>
  <build>
    <item objectid="1"/>
  </build>
</model>"#;

        let model = parse_model_xml(xml).unwrap();
        assert_eq!(model.unit, Some(Unit::Millimeter));
        assert_eq!(model.resources.objects.len(), 1);
        assert_eq!(model.build.items.len(), 1);

        let mesh = model.resources.objects[0].mesh().unwrap();
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.triangles, vec![Triangle::new(0, 1, 2)]);
    }

    #[test]
    fn test_parse_component_with_transform() {
        let xml = r#"<model unit="inch" xmlns="http://schemas.microsoft.com/3dmanufacturing/core/2015/02">
  <resources>
    <object id="1"><mesh><vertices/><triangles/></mesh></object>
    <object id="2" name="Assembly">
      <components>
        <component objectid="1" transform="1 0 0 0 1 0 0 0 1 10 20 30"/>
        <component objectid="1"/>
      </components>
    </object>
  </resources>
  <build><item objectid="2"/></build>
</model>"#;

        let model = parse_model_xml(xml).unwrap();
        assert_eq!(model.unit, Some(Unit::Inch));
        let assembly = &model.resources.objects[1];
        assert_eq!(assembly.name.as_deref(), Some("Assembly"));
        match &assembly.content {
            ObjectContent::Components(components) => {
                assert_eq!(components.len(), 2);
                assert_eq!(
                    components[0].transform,
                    Some(Transform::translation(10.0, 20.0, 30.0))
                );
                assert_eq!(components[1].transform, None);
            }
            other => panic!("expected components, got {:?}", other),
        }
    }

    #[test]
    fn test_metadata_with_entities() {
        let xml = r#"<model unit="millimeter">
  <metadata name="Title">Bolt &amp; Nut</metadata>
  <metadata name="Designer" preserve="1">Jane</metadata>
  <metadata name="vendor:Empty"/>
  <resources/>
  <build/>
</model>"#;

        let model = parse_model_xml(xml).unwrap();
        assert_eq!(model.metadata.len(), 3);
        assert_eq!(model.metadata[0].name, MetadataName::Title);
        assert_eq!(model.metadata[0].value, "Bolt & Nut");
        assert_eq!(model.metadata[1].preserve, Some(true));
        assert_eq!(model.metadata_value("vendor:Empty"), Some(""));
    }

    #[test]
    fn test_reject_invalid_unit() {
        let xml = r#"<model unit="furlong"><resources/><build/></model>"#;
        let err = parse_model_xml(xml).unwrap_err();
        assert!(err.to_string().contains("[E2003]"));
        assert!(err.to_string().contains("furlong"));
    }

    #[test]
    fn test_reject_doctype() {
        let xml = r#"<!DOCTYPE model [<!ENTITY x "y">]><model unit="millimeter"/>"#;
        assert!(parse_model_xml(xml).is_err());
    }

    #[test]
    fn test_reject_out_of_range_vertex() {
        let xml = r#"<model>
  <resources>
    <object id="4">
      <mesh>
        <vertices><vertex x="0" y="0" z="0"/></vertices>
        <triangles><triangle v1="0" v2="1" v3="2"/></triangles>
      </mesh>
    </object>
  </resources>
  <build/>
</model>"#;
        let err = parse_model_xml(xml).unwrap_err();
        assert!(matches!(err, Error::InvalidMesh(_)), "got {:?}", err);
        assert!(err.to_string().contains("Object 4"));
    }

    #[test]
    fn test_reject_malformed_transform() {
        let xml = r#"<model>
  <resources><object id="1"><mesh><vertices/><triangles/></mesh></object></resources>
  <build><item objectid="1" transform="1 0 0 0 1 0"/></build>
</model>"#;
        let err = parse_model_xml(xml).unwrap_err();
        assert!(err.to_string().contains("[E3002]"));
    }

    #[test]
    fn test_unknown_elements_are_skipped() {
        let xml = r#"<model xmlns:s="http://schemas.microsoft.com/3dmanufacturing/slice/2015/07">
  <resources>
    <s:slicestack id="9"><s:slice ztop="1"/></s:slicestack>
    <object id="1"><mesh><vertices/><triangles/></mesh></object>
  </resources>
  <build><item objectid="1"/></build>
</model>"#;
        let model = parse_model_xml(xml).unwrap();
        assert_eq!(model.resources.objects.len(), 1);
        assert_eq!(model.unit, None);
    }
}
