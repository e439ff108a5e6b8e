// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! From extracted layers to an intent tree.
//!
//! Reads a design file (the built-in sample when no path is given), runs the default inference
//! pipeline, and prints a per-pass summary followed by the `root.json` view. With an output
//! directory, `layers.json` and `root.json` are written there instead.
//!
//! Run:
//! - `cargo run -p understory_intent_demos --example infer_layers`
//! - `RUST_LOG=debug cargo run -p understory_intent_demos --example infer_layers -- design.json out/`

use std::error::Error;
use std::path::PathBuf;
use std::{env, fs};

use tracing_subscriber::EnvFilter;
use understory_intent::{InferenceConfig, run_pipeline};
use understory_intent_layers::{DesignFile, box_to_json, export_layers, layer_to_box};

/// A card with a header row of three icons and a caption, plus a loose footer.
const SAMPLE: &str = r#"{
    "rootLayer": {
        "id": "canvas",
        "name": "sample.psd",
        "bbox": { "w": 320, "h": 240 },
        "children": [
            { "id": "card", "name": "Card", "bbox": { "x": 20, "y": 20, "w": 280, "h": 150 } },
            {
                "id": "icons",
                "name": "Icons",
                "bbox": { "x": 40, "y": 40, "w": 160, "h": 40 },
                "children": [
                    { "id": "icon-a", "name": "Home", "bbox": { "x": 40, "y": 40, "w": 40, "h": 40 } },
                    { "id": "icon-b", "name": "Search", "bbox": { "x": 100, "y": 40, "w": 40, "h": 40 } },
                    { "id": "icon-c", "name": "Profile", "bbox": { "x": 160, "y": 40, "w": 40, "h": 40 } }
                ]
            },
            {
                "id": "caption",
                "name": "Caption",
                "bbox": { "x": 40, "y": 120, "w": 200, "h": 24 },
                "text": { "value": "Welcome back" }
            },
            { "id": "footer", "name": "Footer", "bbox": { "x": 20, "y": 190, "w": 280, "h": 30 } }
        ]
    },
    "bitmaps": { "icon-a": "0 - icon-a.jpg", "icon-b": "1 - icon-b.jpg", "icon-c": "2 - icon-c.jpg" }
}"#;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = env::args().skip(1);
    let json = match args.next() {
        Some(path) => fs::read_to_string(path)?,
        None => SAMPLE.to_string(),
    };
    let out_dir = args.next().map(PathBuf::from);

    let design = DesignFile::from_json(&json)?;
    let mut layout = layer_to_box(&design.root_layer)?;
    let layers = export_layers(&layout, &design)?;

    let report = run_pipeline(&mut layout, &InferenceConfig::default())?;
    for pass in &report.passes {
        let preserved = match pass.preserved {
            Some(true) => "preserved",
            Some(false) => "CHANGED",
            None => "unchecked",
        };
        println!(
            "{:<16} {:>3} generated, render {preserved}",
            pass.pass.name(),
            pass.created.len()
        );
    }

    let root = box_to_json(&layout, layout.root())?;
    match out_dir {
        Some(dir) => {
            fs::create_dir_all(&dir)?;
            fs::write(dir.join("layers.json"), serde_json::to_string_pretty(&layers)?)?;
            fs::write(dir.join("root.json"), serde_json::to_string_pretty(&root)?)?;
            println!("exported layers.json and root.json to {}", dir.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&root)?),
    }
    tracing::info!(preserved = report.preserved(), "done");
    Ok(())
}
