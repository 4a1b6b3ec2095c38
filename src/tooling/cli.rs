//! CLI Tooling
//!
//! Command-line interface for catalog maintenance and queries. Every command
//! runs against the workspace's configured store and returns its output as a
//! string; the binary only prints it.

use crate::api::CatalogApi;
use crate::bulk::{BulkLoadReport, CatalogManifest};
use crate::config::{CatalogConfig, ConfigLoader, WORKSPACE_CONFIG_FILE};
use crate::error::{CatalogError, StorageError};
use crate::logging::LoggingConfig;
use crate::tooling::format::{
    format_categories_text, format_category_detail_text, format_class_counts_text,
    format_colors_text, format_composed_items_text, format_elements_text,
    format_item_detail_text, format_items_text, format_load_report_text, format_path_text,
    format_size_report_text, format_status_text, format_subtree_text, format_validation_text,
};
use crate::types::{CategoryId, ItemClass, ItemId};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Brickgraph CLI - catalog graph engine for construction-toy sets
#[derive(Parser)]
#[command(name = "brickgraph")]
#[command(about = "Theme hierarchy, memberships and part composition for a toy-set catalog")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Enable verbose logging (debug level)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Fold the logging flags into the configured logging section
    pub fn apply_log_overrides(&self, logging: &mut LoggingConfig) {
        if self.verbose {
            logging.level = "debug".to_string();
        }
        if let Some(level) = &self.log_level {
            logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            logging.file = Some(file.clone());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a starter config file and create the root category
    Init {
        /// Overwrite an existing workspace config file
        #[arg(long)]
        force: bool,
    },
    /// Load the built-in demo catalog into an empty store
    Seed {
        /// Skip recomputing sizes after loading
        #[arg(long)]
        no_recompute: bool,
    },
    /// Load a JSON or YAML catalog manifest
    Load {
        /// Manifest file (.json, .yaml or .yml)
        manifest: PathBuf,
        /// Skip recomputing sizes after loading
        #[arg(long)]
        no_recompute: bool,
    },
    /// Recompute cached subtree sizes
    Recompute {
        /// Category to start from (default: the root)
        #[arg(long, allow_negative_numbers = true)]
        root: Option<i64>,
    },
    /// Check catalog integrity
    Validate,
    /// Show table counts and the root size
    Status,
    /// Category queries
    Category {
        #[command(subcommand)]
        command: CategoryCommands,
    },
    /// Item queries
    Item {
        #[command(subcommand)]
        command: ItemCommands,
    },
    /// Composition maintenance
    Composition {
        #[command(subcommand)]
        command: CompositionCommands,
    },
}

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List categories without a parent
    Roots,
    /// Show the path from the root to a category
    Path {
        #[arg(allow_negative_numbers = true)]
        id: i64,
    },
    /// Show the nested subtree below a category
    Tree {
        #[arg(allow_negative_numbers = true)]
        id: i64,
    },
    /// List every item below a category with its path
    Elements {
        #[arg(allow_negative_numbers = true)]
        id: i64,
    },
    /// List distinct items below a category
    Objects {
        #[arg(allow_negative_numbers = true)]
        id: i64,
    },
    /// Show a category with its subcategories and items
    Show {
        #[arg(allow_negative_numbers = true)]
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum ItemCommands {
    /// Show an item with images, composition counts and path
    Show { id: String },
    /// What an item is made of
    ConsistsOf {
        id: String,
        /// List parts of this class code (0-7) instead of counting
        #[arg(long)]
        class: Option<i64>,
    },
    /// What an item is used in
    AppearsIn {
        id: String,
        /// List sets of this class code (0-7) instead of counting
        #[arg(long)]
        class: Option<i64>,
    },
    /// Search item names
    Search { query: String },
    /// Colors an item is used in as a part
    Colors { id: String },
}

#[derive(Subcommand)]
pub enum CompositionCommands {
    /// Remove one set -> part edge
    Remove {
        set: String,
        part: String,
        /// Edge color (default: the configured default color)
        #[arg(long)]
        color: Option<String>,
    },
}

/// CLI context for command execution
pub struct CliContext {
    api: CatalogApi,
    config: CatalogConfig,
    workspace_root: PathBuf,
    format: OutputFormat,
}

impl CliContext {
    /// Create a new CLI context
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, CatalogError> {
        let config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Self::with_config(workspace_root, config)
    }

    /// Create a context from an already loaded configuration
    pub fn with_config(workspace_root: PathBuf, config: CatalogConfig) -> Result<Self, CatalogError> {
        let api = CatalogApi::open(&config, &workspace_root)?;
        Ok(Self {
            api,
            config,
            workspace_root,
            format: OutputFormat::Text,
        })
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn api(&self) -> &CatalogApi {
        &self.api
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, CatalogError> {
        let started = Instant::now();
        let output = match command {
            Commands::Init { force } => self.handle_init(*force),
            Commands::Seed { no_recompute } => self.handle_seed(*no_recompute),
            Commands::Load {
                manifest,
                no_recompute,
            } => self.handle_load(manifest, *no_recompute),
            Commands::Recompute { root } => {
                let root = root.map(CategoryId).unwrap_or(self.api.settings().root_id);
                let report = self.api.recompute_sizes(root)?;
                self.render(&report, format_size_report_text)
            }
            Commands::Validate => {
                let report = self.api.validate()?;
                self.render(&report, format_validation_text)
            }
            Commands::Status => {
                let status = self.api.stats()?;
                self.render(&status, format_status_text)
            }
            Commands::Category { command } => self.handle_category(command),
            Commands::Item { command } => self.handle_item(command),
            Commands::Composition { command } => self.handle_composition(command),
        }?;
        info!(duration_ms = started.elapsed().as_millis() as u64, "Command finished");
        Ok(output)
    }

    fn render<T: Serialize>(&self, value: &T, text: impl FnOnce(&T) -> String) -> Result<String, CatalogError> {
        match self.format {
            OutputFormat::Text => Ok(text(value)),
            OutputFormat::Json => to_json(value),
        }
    }

    fn handle_init(&self, force: bool) -> Result<String, CatalogError> {
        let config_file = self.workspace_root.join(WORKSPACE_CONFIG_FILE);
        let wrote_config = if config_file.exists() && !force {
            false
        } else {
            std::fs::create_dir_all(&self.workspace_root)?;
            std::fs::write(&config_file, self.config.to_toml()?)?;
            true
        };

        let mut loader = self.api.bulk_loader();
        let root = loader.ensure_root()?;
        loader.finish();
        self.api.flush()?;

        match self.format {
            OutputFormat::Json => to_json(&json!({
                "config_file": config_file,
                "config_written": wrote_config,
                "root": root,
            })),
            OutputFormat::Text => {
                let mut out = String::new();
                if wrote_config {
                    out.push_str(&format!("Wrote {}\n", config_file.display()));
                } else {
                    out.push_str(&format!(
                        "Kept existing {} (use --force to overwrite)\n",
                        config_file.display()
                    ));
                }
                out.push_str(&format!("Root category: {} ({})\n", root.name, root.id));
                Ok(out)
            }
        }
    }

    fn handle_seed(&self, no_recompute: bool) -> Result<String, CatalogError> {
        let report = self.api.seed_demo()?;
        self.after_load(report, no_recompute)
    }

    fn handle_load(&self, path: &Path, no_recompute: bool) -> Result<String, CatalogError> {
        let manifest = CatalogManifest::from_path(path)?;
        let report = self.api.load_manifest(&manifest)?;
        self.after_load(report, no_recompute)
    }

    fn after_load(
        &self,
        report: BulkLoadReport,
        no_recompute: bool,
    ) -> Result<String, CatalogError> {
        let sizes = if no_recompute {
            None
        } else {
            Some(self.api.recompute_sizes(self.api.settings().root_id)?)
        };
        match self.format {
            OutputFormat::Json => to_json(&json!({ "load": report, "sizes": sizes })),
            OutputFormat::Text => {
                let mut out = format_load_report_text(&report);
                if let Some(sizes) = &sizes {
                    out.push_str(&format_size_report_text(sizes));
                }
                Ok(out)
            }
        }
    }

    fn handle_category(&self, command: &CategoryCommands) -> Result<String, CatalogError> {
        match command {
            CategoryCommands::Roots => {
                let roots = self.api.root_categories()?;
                self.render(&roots, |roots| format_categories_text("Root categories", roots))
            }
            CategoryCommands::Path { id } => {
                let path = self.api.path_to_root(CategoryId(*id))?;
                self.render(&path, |path| format_path_text(path))
            }
            CategoryCommands::Tree { id } => {
                let view = self.api.category_subtree(CategoryId(*id))?;
                self.render(&view, format_subtree_text)
            }
            CategoryCommands::Elements { id } => {
                let view = self.api.category_elements(CategoryId(*id))?;
                self.render(&view, format_elements_text)
            }
            CategoryCommands::Objects { id } => {
                let objects = self.api.all_objects(CategoryId(*id))?;
                self.render(&objects, |objects| format_items_text("Objects", objects))
            }
            CategoryCommands::Show { id } => {
                let view = self.api.category_detail(CategoryId(*id))?;
                self.render(&view, format_category_detail_text)
            }
        }
    }

    fn handle_item(&self, command: &ItemCommands) -> Result<String, CatalogError> {
        match command {
            ItemCommands::Show { id } => {
                let detail = self.api.item_detail(&ItemId::from(id.as_str()))?;
                self.render(&detail, format_item_detail_text)
            }
            ItemCommands::ConsistsOf { id, class } => {
                let id = ItemId::from(id.as_str());
                match class {
                    Some(code) => {
                        let class = ItemClass::from_code(*code)?;
                        let parts = self.api.consists_of_detailed(&id, class)?;
                        self.render(&parts, |parts| {
                            format_composed_items_text("Consists of", class, parts)
                        })
                    }
                    None => {
                        let counts = self.api.consists_of(&id)?;
                        self.render(&counts, |counts| format_class_counts_text("Consists of", counts))
                    }
                }
            }
            ItemCommands::AppearsIn { id, class } => {
                let id = ItemId::from(id.as_str());
                match class {
                    Some(code) => {
                        let class = ItemClass::from_code(*code)?;
                        let sets = self.api.appears_in_detailed(&id, class)?;
                        self.render(&sets, |sets| format_composed_items_text("Appears in", class, sets))
                    }
                    None => {
                        let counts = self.api.appears_in(&id)?;
                        self.render(&counts, |counts| format_class_counts_text("Appears in", counts))
                    }
                }
            }
            ItemCommands::Search { query } => {
                let items = self.api.search_items(query)?;
                self.render(&items, |items| {
                    format_items_text(&format!("Items matching \"{}\"", query), items)
                })
            }
            ItemCommands::Colors { id } => {
                let colors = self.api.known_colors(&ItemId::from(id.as_str()))?;
                self.render(&colors, format_colors_text)
            }
        }
    }

    fn handle_composition(&self, command: &CompositionCommands) -> Result<String, CatalogError> {
        match command {
            CompositionCommands::Remove { set, part, color } => {
                let color = color
                    .clone()
                    .unwrap_or_else(|| self.api.settings().default_color.clone());
                let set = ItemId::from(set.as_str());
                let part = ItemId::from(part.as_str());
                self.api.remove_composition(&set, &part, &color)?;
                match self.format {
                    OutputFormat::Json => to_json(&json!({
                        "removed": { "set": set, "part": part, "color": color }
                    })),
                    OutputFormat::Text => Ok(format!(
                        "Removed {} -> {} ({}). Sizes are unchanged; compositions do not count toward them.\n",
                        set, part, color
                    )),
                }
            }
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, CatalogError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CatalogError::StorageError(StorageError::Serialization(e.to_string())))
}
