//! Shared fixtures for integration tests
//!
//! Builds 3MF packages in memory from a model document so tests can go
//! through the same package reader as real files.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="model" ContentType="application/vnd.ms-package.3dmanufacturing-3dmodel+xml"/>
</Types>"#;

pub const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rel0" Target="/3D/3dmodel.model" Type="http://schemas.microsoft.com/3dmanufacturing/2013/01/3dmodel"/>
</Relationships>"#;

/// Zip a model document into package bytes
pub fn package_bytes(model_xml: &str) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(CONTENT_TYPES.as_bytes()).unwrap();
    zip.start_file("_rels/.rels", options).unwrap();
    zip.write_all(RELS.as_bytes()).unwrap();
    zip.start_file("3D/3dmodel.model", options).unwrap();
    zip.write_all(model_xml.as_bytes()).unwrap();

    zip.finish().unwrap().into_inner()
}

/// A readable package for a model document
pub fn package(model_xml: &str) -> Cursor<Vec<u8>> {
    Cursor::new(package_bytes(model_xml))
}

/// Wrap resources and build sections in a model element
pub fn model_xml(unit: &str, resources: &str, build: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<model unit="{}" xml:lang="en-US"
       xmlns="http://schemas.microsoft.com/3dmanufacturing/core/2015/02"
       xmlns:m="http://schemas.microsoft.com/3dmanufacturing/material/2015/02"
       xmlns:c="https://cadova.org/3mf">
    <resources>
{}
    </resources>
    <build>
{}
    </build>
</model>"#,
        unit, resources, build
    )
}

/// Mesh element for a unit cube with outward facing triangles
///
/// `triangle_attributes` is appended to every triangle element.
pub fn cube_mesh(triangle_attributes: &str) -> String {
    let mut xml = String::from("<mesh>\n<vertices>\n");
    for i in 0..8 {
        xml.push_str(&format!(
            "<vertex x=\"{}\" y=\"{}\" z=\"{}\"/>\n",
            i & 1,
            (i >> 1) & 1,
            (i >> 2) & 1
        ));
    }
    xml.push_str("</vertices>\n<triangles>\n");
    for [v1, v2, v3] in CUBE_TRIANGLES {
        xml.push_str(&format!(
            "<triangle v1=\"{}\" v2=\"{}\" v3=\"{}\" {}/>\n",
            v1, v2, v3, triangle_attributes
        ));
    }
    xml.push_str("</triangles>\n</mesh>");
    xml
}

/// Triangles of the unit cube; vertex `i` sits at `(i & 1, (i >> 1) & 1, (i >> 2) & 1)`
pub const CUBE_TRIANGLES: [[usize; 3]; 12] = [
    [0, 2, 3],
    [0, 3, 1],
    [4, 5, 7],
    [4, 7, 6],
    [0, 1, 5],
    [0, 5, 4],
    [2, 6, 7],
    [2, 7, 3],
    [0, 4, 6],
    [0, 6, 2],
    [1, 3, 7],
    [1, 7, 5],
];

/// Mesh element with a single triangle in the XY plane
pub fn triangle_mesh(triangle_attributes: &str) -> String {
    format!(
        r#"<mesh>
<vertices>
<vertex x="0" y="0" z="0"/>
<vertex x="1" y="0" z="0"/>
<vertex x="0" y="1" z="0"/>
</vertices>
<triangles>
<triangle v1="0" v2="1" v3="2" {}/>
</triangles>
</mesh>"#,
        triangle_attributes
    )
}
