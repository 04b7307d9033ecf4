//! Materials extension parsing
//!
//! Color groups, base materials and the PBR display property groups that
//! they reference.

use crate::error::{Error, Result};
use crate::model::*;
use quick_xml::events::BytesStart;

use super::{optional_number, parse_attributes};

fn parse_color_value(element: &str, attribute: &str, value: &str) -> Result<Color> {
    Color::from_hex(value).ok_or_else(|| {
        Error::parse_error_with_context(
            &format!("{}@{}", element, attribute),
            value,
            "#RRGGBB or #RRGGBBAA color",
        )
    })
}

/// Parse a `<color>` entry of a color group
pub fn parse_color_element(e: &BytesStart) -> Result<Color> {
    let attrs = parse_attributes(e)?;
    let value = attrs
        .get("color")
        .ok_or_else(|| Error::missing_attribute("color", "color"))?;
    parse_color_value("color", "color", value)
}

/// Parse a `<base>` entry of a base materials group
///
/// A missing or unreadable display color falls back to white.
pub fn parse_base_element(e: &BytesStart) -> Result<BaseMaterial> {
    let attrs = parse_attributes(e)?;

    let name = attrs.get("name").cloned().unwrap_or_default();
    let display_color = attrs
        .get("displaycolor")
        .and_then(|value| Color::from_hex(value))
        .unwrap_or(Color::WHITE);

    Ok(BaseMaterial::new(name, display_color))
}

/// Parse a `<pbmetallic>` entry
pub fn parse_metallic_element(e: &BytesStart) -> Result<MetallicDisplayProperty> {
    let attrs = parse_attributes(e)?;
    let defaults = MetallicDisplayProperty::default();

    Ok(MetallicDisplayProperty {
        name: attrs.get("name").cloned(),
        metallicness: optional_number(&attrs, "pbmetallic", "metallicness")?
            .unwrap_or(defaults.metallicness),
        roughness: optional_number(&attrs, "pbmetallic", "roughness")?
            .unwrap_or(defaults.roughness),
    })
}

/// Parse a `<pbspecular>` entry
pub fn parse_specular_element(e: &BytesStart) -> Result<SpecularDisplayProperty> {
    let attrs = parse_attributes(e)?;
    let defaults = SpecularDisplayProperty::default();

    let specular_color = match attrs.get("specularcolor") {
        Some(value) => parse_color_value("pbspecular", "specularcolor", value)?,
        None => defaults.specular_color,
    };

    Ok(SpecularDisplayProperty {
        name: attrs.get("name").cloned(),
        specular_color,
        glossiness: optional_number(&attrs, "pbspecular", "glossiness")?
            .unwrap_or(defaults.glossiness),
    })
}

#[cfg(test)]
mod tests {
    use super::super::parse_model_xml;
    use super::*;

    const MATERIALS_XML: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<model unit="millimeter" xmlns="http://schemas.microsoft.com/3dmanufacturing/core/2015/02"
       xmlns:m="http://schemas.microsoft.com/3dmanufacturing/material/2015/02">
  <resources>
    <m:pbmetallicdisplayproperties id="10">
      <m:pbmetallic name="Steel" metallicness="0.8" roughness="0.2"/>
      <m:pbmetallic name="Plastic"/>
    </m:pbmetallicdisplayproperties>
    <m:pbspeculardisplayproperties id="11">
      <m:pbspecular name="Gloss" specularcolor="#FFFFFF" glossiness="0.9"/>
      <m:pbspecular/>
    </m:pbspeculardisplayproperties>
    <basematerials id="1" displaypropertiesid="10">
      <base name="Steel" displaycolor="#C0C0C0"/>
      <base name="Broken" displaycolor="silver"/>
    </basematerials>
    <m:colorgroup id="2">
      <m:color color="#FF0000"/>
      <m:color color="#00FF0080"/>
    </m:colorgroup>
  </resources>
  <build/>
</model>"##;

    #[test]
    fn test_parse_material_groups() {
        let model = parse_model_xml(MATERIALS_XML).unwrap();
        let resources = &model.resources;

        assert_eq!(resources.base_material_groups.len(), 1);
        let base = &resources.base_material_groups[0];
        assert_eq!(base.display_properties_id, Some(10));
        assert_eq!(base.materials[0].display_color, Color::rgb(0xC0, 0xC0, 0xC0));
        assert_eq!(base.materials[1].display_color, Color::WHITE);

        let colors = &resources.color_groups[0];
        assert_eq!(colors.display_properties_id, None);
        assert_eq!(
            colors.colors,
            vec![Color::rgb(255, 0, 0), Color::rgba(0, 255, 0, 0x80)]
        );

        let metallic = &resources.metallic_display_properties[0];
        assert_eq!(metallic.id, 10);
        assert_eq!(metallic.metallics[0].metallicness, 0.8);
        assert_eq!(metallic.metallics[0].roughness, 0.2);
        assert_eq!(metallic.metallics[1].metallicness, 0.0);
        assert_eq!(metallic.metallics[1].roughness, 1.0);

        let specular = &resources.specular_display_properties[0];
        assert_eq!(specular.speculars[0].glossiness, 0.9);
        assert_eq!(specular.speculars[1].specular_color, Color::rgb(0x38, 0x38, 0x38));
    }

    #[test]
    fn test_invalid_color_entry_is_an_error() {
        let xml = r##"<model xmlns:m="http://schemas.microsoft.com/3dmanufacturing/material/2015/02">
  <resources><m:colorgroup id="2"><m:color color="#XYZ"/></m:colorgroup></resources>
  <build/>
</model>"##;
        let err = parse_model_xml(xml).unwrap_err();
        assert!(err.to_string().contains("[E3002]"));
        assert!(err.to_string().contains("#XYZ"));
    }
}
