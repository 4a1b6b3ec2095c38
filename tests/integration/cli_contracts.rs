use std::fs;
use std::path::Path;

use brickgraph::store::CatalogStore;
use brickgraph::tooling::cli::{
    CategoryCommands, Cli, CliContext, Commands, CompositionCommands, ItemCommands, OutputFormat,
};
use clap::Parser;
use tempfile::TempDir;

/// Config file pointing the sled store into the temp dir, so nothing touches
/// the user's XDG directories
fn write_config(temp: &TempDir) -> std::path::PathBuf {
    let store = temp.path().join("store");
    let config = temp.path().join("brickgraph-test.toml");
    fs::write(
        &config,
        format!(
            "[storage]\nbackend = \"sled\"\npath = {:?}\n\n[logging]\nenabled = false\n",
            store.display().to_string()
        ),
    )
    .unwrap();
    config
}

fn context(workspace: &Path, config: &Path, format: OutputFormat) -> CliContext {
    CliContext::new(workspace.to_path_buf(), Some(config.to_path_buf()))
        .unwrap()
        .with_format(format)
}

#[test]
fn parse_valid_command_matrix() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["brickgraph", "init"],
        vec!["brickgraph", "init", "--force"],
        vec!["brickgraph", "seed", "--no-recompute"],
        vec!["brickgraph", "load", "catalog.yaml"],
        vec!["brickgraph", "recompute", "--root", "2"],
        vec!["brickgraph", "validate", "--format", "json"],
        vec!["brickgraph", "--format", "json", "status"],
        vec!["brickgraph", "category", "roots"],
        vec!["brickgraph", "category", "path", "5"],
        vec!["brickgraph", "category", "path", "-3"],
        vec!["brickgraph", "category", "tree", "1"],
        vec!["brickgraph", "category", "elements", "2"],
        vec!["brickgraph", "category", "objects", "2"],
        vec!["brickgraph", "category", "show", "3"],
        vec!["brickgraph", "item", "show", "75192"],
        vec!["brickgraph", "item", "consists-of", "75192", "--class", "1"],
        vec!["brickgraph", "item", "appears-in", "3001"],
        vec!["brickgraph", "item", "search", "falcon"],
        vec!["brickgraph", "item", "colors", "3001"],
        vec!["brickgraph", "composition", "remove", "75192", "3001", "--color", "Red"],
        vec!["brickgraph", "--workspace", "/tmp/ws", "--log-output", "stderr", "status"],
    ];

    for args in cases {
        let parsed = Cli::try_parse_from(args.clone());
        assert!(parsed.is_ok(), "expected valid parse for args: {args:?}");
    }
}

#[test]
fn parse_rejects_invalid_commands() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["brickgraph"],
        vec!["brickgraph", "load"],
        vec!["brickgraph", "category", "tree"],
        vec!["brickgraph", "category", "tree", "root"],
        vec!["brickgraph", "item", "consists-of"],
        vec!["brickgraph", "composition", "remove", "75192"],
        vec!["brickgraph", "--format", "yaml", "status"],
        vec!["brickgraph", "frobnicate"],
    ];
    for args in cases {
        assert!(
            Cli::try_parse_from(args.clone()).is_err(),
            "expected parse failure for args: {args:?}"
        );
    }
}

#[test]
fn seeded_sled_store_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp);
    let workspace = temp.path().join("workspace");
    fs::create_dir_all(&workspace).unwrap();

    {
        let cli = context(&workspace, &config, OutputFormat::Text);
        let output = cli.execute(&Commands::Seed { no_recompute: false }).unwrap();
        assert!(output.contains("Recomputed 24 categories"));
    }

    let cli = context(&workspace, &config, OutputFormat::Json);
    let status: serde_json::Value =
        serde_json::from_str(&cli.execute(&Commands::Status).unwrap()).unwrap();
    assert_eq!(status["categories"], 24);
    assert_eq!(status["items"], 240);
    assert_eq!(status["compositions"], 200);
    assert_eq!(status["root"]["size"], 40);

    let validation: serde_json::Value =
        serde_json::from_str(&cli.execute(&Commands::Validate).unwrap()).unwrap();
    assert_eq!(validation["valid"], true);
    assert!(validation["errors"].as_array().unwrap().is_empty());
}

#[test]
fn item_and_category_json_contracts() {
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp);
    let cli = context(temp.path(), &config, OutputFormat::Json);
    cli.execute(&Commands::Seed { no_recompute: false }).unwrap();

    let item: serde_json::Value = serde_json::from_str(
        &cli.execute(&Commands::Item {
            command: ItemCommands::Show {
                id: "2000".to_string(),
            },
        })
        .unwrap(),
    )
    .unwrap();
    assert_eq!(item["id"], "2000");
    assert_eq!(item["item_class"], 0);
    assert_eq!(item["consists_of"]["Parts"], 3);
    assert_eq!(item["consists_of"]["MF"], 1);
    assert_eq!(item["consists_of"]["Instructions"], 1);
    assert_eq!(item["images"][0], "/media/generated_images/2000_Default.jpg");
    assert_eq!(item["path"].as_array().unwrap().len(), 5);

    let tree: serde_json::Value = serde_json::from_str(
        &cli.execute(&Commands::Category {
            command: CategoryCommands::Tree { id: 1 },
        })
        .unwrap(),
    )
    .unwrap();
    let top = tree["tree"].as_array().unwrap();
    assert_eq!(top.len(), 3);
    assert_eq!(top[0]["kind"], "branch");
    assert_eq!(top[0]["name"], "Star Wars");
    assert_eq!(top[0]["size"], 15);

    let colors: serde_json::Value = serde_json::from_str(
        &cli.execute(&Commands::Item {
            command: ItemCommands::Colors {
                id: "2005".to_string(),
            },
        })
        .unwrap(),
    )
    .unwrap();
    assert_eq!(colors, serde_json::json!(["Default"]));
}

#[test]
fn composition_remove_round_trip() {
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp);
    let cli = context(temp.path(), &config, OutputFormat::Text);
    cli.execute(&Commands::Seed { no_recompute: true }).unwrap();

    let remove = Commands::Composition {
        command: CompositionCommands::Remove {
            set: "2000".to_string(),
            part: "2005".to_string(),
            color: None,
        },
    };
    let output = cli.execute(&remove).unwrap();
    assert!(output.contains("Removed 2000 -> 2005 (Default)"));
    assert!(cli.execute(&remove).unwrap_err().is_not_found());

    let counts = cli
        .api()
        .consists_of(&brickgraph::ItemId::from("2000"))
        .unwrap();
    assert_eq!(counts.parts, 2);
}

#[test]
fn load_yaml_manifest() {
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp);
    let manifest = temp.path().join("catalog.yaml");
    fs::write(
        &manifest,
        r#"
categories:
  - name: Star Wars
    children:
      - name: Starfighters
        items:
          - { id: "75301", name: "Luke Skywalker's X-Wing Fighter", class: 0 }
items:
  - { id: "3023", name: "Plate 1 x 2", class: 1 }
compositions:
  - { set: "75301", part: "3023", part_count: 12, color: "Light Bluish Gray" }
image_template: "/img/{id}/{color}.jpg"
"#,
    )
    .unwrap();

    let cli = context(temp.path(), &config, OutputFormat::Text);
    let output = cli
        .execute(&Commands::Load {
            manifest: manifest.clone(),
            no_recompute: false,
        })
        .unwrap();
    assert!(output.contains("Recomputed 3 categories"));

    let images = cli
        .api()
        .store()
        .images_of_item(&brickgraph::ItemId::from("3023"))
        .unwrap();
    assert_eq!(images[0].address, "/img/3023/Light_Bluish_Gray.jpg");

    let path = cli
        .execute(&Commands::Category {
            command: CategoryCommands::Path { id: 3 },
        })
        .unwrap();
    assert!(path.contains("BRICK Database > Star Wars > Starfighters"));
}
