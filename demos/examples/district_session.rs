// Copyright 2026 the Blockyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! District session.
//!
//! Load districts and nodes from JSON, adopt a baked block for editing, and
//! fill fixed-capacity instance buffers for every render bucket.
//!
//! Run:
//! - `cargo run -p blockyard_demos --example district_session`

use blockyard_resolve::{District, Editor, pad_to_capacity};
use blockyard_topology::{NodeMap, Tag};

const DISTRICTS: &str = r#"[
    {
        "name": "watson",
        "origin": [0.0, 0.0, 0.0],
        "size": [200.0, 200.0, 60.0],
        "cubeSize": 0.5,
        "baked": [
            {
                "id": "warehouse",
                "position": [0.4, 0.4, 0.0, 1.0],
                "orientation": [0.0, 0.0, 0.0, 1.0],
                "scale": [0.1, 0.2, 0.1, 1.0]
            }
        ]
    },
    {
        "name": "heywood",
        "origin": [200.0, 0.0, 0.0],
        "size": [200.0, 200.0, 60.0],
        "cubeSize": 0.5
    }
]"#;

const NODES: &str = r#"[
    {
        "id": "market",
        "type": "group",
        "label": "Night market",
        "root": { "District": "watson" },
        "position": [120.0, 40.0, 0.0],
        "rotation": [0.0, 0.0, 0.0],
        "scale": [1.0, 1.0, 1.0]
    },
    {
        "id": "stall",
        "type": "instance",
        "parent": "market",
        "root": { "District": "watson" },
        "position": [0.0, 0.0, 0.0],
        "rotation": [0.0, 0.0, 0.0],
        "scale": [2.0, 3.0, 2.5],
        "pattern": {
            "count": 4,
            "position": [6.0, 0.0, 0.0],
            "rotation": [0.0, 0.0, 0.0],
            "scale": [0.0, 0.0, 0.0]
        }
    },
    {
        "id": "billboard",
        "type": "instance",
        "parent": "market",
        "root": { "District": "watson" },
        "position": [0.0, 10.0, 0.0],
        "rotation": [0.0, 0.0, 0.0],
        "scale": [8.0, 1.0, 90.0]
    },
    {
        "id": "kiosk",
        "type": "instance",
        "root": { "District": "heywood" },
        "position": [230.0, 30.0, 0.0],
        "rotation": [0.0, 0.0, 0.0],
        "scale": [2.0, 2.0, 3.0]
    }
]"#;

const CAPACITY: usize = 16;

fn main() {
    let districts: Vec<District> = serde_json::from_str(DISTRICTS).unwrap();
    let nodes: NodeMap = serde_json::from_str(NODES).unwrap();
    let mut editor = Editor::new(nodes, districts, "watson").unwrap();

    editor.adopt_baked("watson", 0, "warehouse").unwrap();
    editor
        .edit("warehouse", |n| n.tag = Tag::Delete)
        .unwrap();

    let frame = editor.render_buckets().unwrap();
    for (name, bucket) in [
        ("additions", frame.additions),
        ("updates", frame.updates),
        ("deletions", frame.deletions),
        ("previews", frame.previews),
    ] {
        let real = bucket.len();
        let mut buffer = bucket;
        pad_to_capacity(&mut buffer, CAPACITY);
        println!("{name}: {real} of {} slots", buffer.len());
        for t in buffer.iter().filter(|t| t.is_real()) {
            println!("  {:<10} {:?}", t.id.as_str(), t.position);
        }
    }

    for id in ["stall", "billboard"] {
        println!("advisories for {id}: {:?}", editor.advisories(id));
    }
    println!("market summary: {:?}", editor.summary("market"));
}
