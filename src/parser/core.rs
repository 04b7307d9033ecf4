//! Core 3MF element parsing
//!
//! Objects, vertices, triangles, components and build items.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::model::*;
use quick_xml::events::BytesStart;

use super::{optional_number, parse_attributes, parse_number, required_number};

/// Parse object element attributes
///
/// The returned object holds an empty mesh until its `<mesh>` or
/// `<components>` child has been read.
pub fn parse_object(e: &BytesStart) -> Result<Object> {
    let attrs = parse_attributes(e)?;

    let mut object = Object::new(required_number(&attrs, "object", "id")?, Mesh::new());
    object.name = attrs.get("name").cloned();
    object.part_number = attrs.get("partnumber").cloned();
    object.properties = PartialPropertyReference::new(
        optional_number(&attrs, "object", "pid")?,
        optional_number(&attrs, "object", "pindex")?,
    );

    Ok(object)
}

/// Parse vertex element attributes
pub fn parse_vertex(e: &BytesStart) -> Result<Vertex> {
    // Parse attributes directly without building a HashMap
    let mut x_opt: Option<f64> = None;
    let mut y_opt: Option<f64> = None;
    let mut z_opt: Option<f64> = None;

    for attr_result in e.attributes() {
        let attr = attr_result?;
        let target = match attr.key.as_ref() {
            b"x" => &mut x_opt,
            b"y" => &mut y_opt,
            b"z" => &mut z_opt,
            _ => continue,
        };
        let value = std::str::from_utf8(&attr.value).map_err(|e| Error::InvalidXml(e.to_string()))?;
        *target = Some(value.trim().parse::<f64>()?);
    }

    let x = x_opt.ok_or_else(|| Error::missing_attribute("vertex", "x"))?;
    let y = y_opt.ok_or_else(|| Error::missing_attribute("vertex", "y"))?;
    let z = z_opt.ok_or_else(|| Error::missing_attribute("vertex", "z"))?;

    if !(x.is_finite() && y.is_finite() && z.is_finite()) {
        return Err(Error::ParseError(format!(
            "Vertex coordinates must be finite (got {}, {}, {})",
            x, y, z
        )));
    }

    Ok(Vertex::new(x, y, z))
}

/// Parse triangle element attributes
///
/// `p1` alone selects a uniform property index; `p1`, `p2` and `p3`
/// together select one index per vertex.
pub fn parse_triangle(e: &BytesStart) -> Result<Triangle> {
    let mut v: [Option<usize>; 3] = [None; 3];
    let mut p: [Option<ResourceIndex>; 3] = [None; 3];
    let mut pid: Option<ResourceId> = None;

    for attr_result in e.attributes() {
        let attr = attr_result?;
        let key = attr.key.as_ref();
        let value = std::str::from_utf8(&attr.value).map_err(|e| Error::InvalidXml(e.to_string()))?;

        match key {
            b"v1" => v[0] = Some(parse_number("triangle", "v1", value)?),
            b"v2" => v[1] = Some(parse_number("triangle", "v2", value)?),
            b"v3" => v[2] = Some(parse_number("triangle", "v3", value)?),
            b"pid" => pid = Some(parse_number("triangle", "pid", value)?),
            b"p1" => p[0] = Some(parse_number("triangle", "p1", value)?),
            b"p2" => p[1] = Some(parse_number("triangle", "p2", value)?),
            b"p3" => p[2] = Some(parse_number("triangle", "p3", value)?),
            _ => {}
        }
    }

    let v1 = v[0].ok_or_else(|| Error::missing_attribute("triangle", "v1"))?;
    let v2 = v[1].ok_or_else(|| Error::missing_attribute("triangle", "v2"))?;
    let v3 = v[2].ok_or_else(|| Error::missing_attribute("triangle", "v3"))?;

    let mut triangle = Triangle::new(v1, v2, v3);
    triangle.property_group = pid;
    triangle.property_index = match p {
        [Some(p1), Some(p2), Some(p3)] => Some(PropertyIndex::PerVertex([p1, p2, p3])),
        [Some(p1), _, _] => Some(PropertyIndex::Uniform(p1)),
        _ => None,
    };

    Ok(triangle)
}

/// Parse component element attributes
pub fn parse_component(e: &BytesStart) -> Result<Component> {
    let attrs = parse_attributes(e)?;

    let mut component = Component::new(required_number(&attrs, "component", "objectid")?);
    component.transform = attrs
        .get("transform")
        .map(|value| Transform::parse(value))
        .transpose()?;
    component.properties = PartialPropertyReference::new(
        optional_number(&attrs, "component", "pid")?,
        optional_number(&attrs, "component", "pindex")?,
    );

    Ok(component)
}

/// Parse build item element attributes
///
/// Prefixed attributes are resolved against `namespaces` (and any
/// declarations on the item itself) and kept as extension attributes.
pub fn parse_build_item(e: &BytesStart, namespaces: &HashMap<String, String>) -> Result<BuildItem> {
    let attrs = parse_attributes(e)?;

    let mut item = BuildItem::new(required_number(&attrs, "item", "objectid")?);
    item.transform = attrs
        .get("transform")
        .map(|value| Transform::parse(value))
        .transpose()?;
    item.part_number = attrs.get("partnumber").cloned();

    let local_namespaces: HashMap<&str, &str> = attrs
        .iter()
        .filter_map(|(key, value)| Some((key.strip_prefix("xmlns:")?, value.as_str())))
        .collect();

    for (key, value) in &attrs {
        if matches!(key.as_str(), "objectid" | "transform" | "partnumber" | "xmlns")
            || key.starts_with("xmlns:")
        {
            continue;
        }

        let name = match key.split_once(':') {
            Some((prefix, local_name)) => {
                let namespace = local_namespaces
                    .get(prefix)
                    .copied()
                    .or_else(|| namespaces.get(prefix).map(String::as_str));
                match namespace {
                    Some(namespace) => ExpandedName::new(Some(namespace), local_name),
                    None => {
                        log::debug!(
                            "Build item attribute '{}' uses undeclared prefix '{}'",
                            key,
                            prefix
                        );
                        continue;
                    }
                }
            }
            None => ExpandedName::new(None, key),
        };
        item.custom_attributes.insert(name, value.clone());
    }

    Ok(item)
}
