use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::display::{
    actions_table, breadcrumb_trail, print_error, spot_table, state_table, statistics_table,
    strategy_rows,
};
use crate::navigator::TreeNavigator;
use crate::sample::{sample_name, sample_settings, sample_tree};
use crate::settings::{normalize_settings, GameSettings};
use crate::spot::SpotRecord;
use crate::state::{action_sequence, pot_and_contributions, stack_absolute};
use crate::storage::{FsObjectStore, StrategyArchive, TreeCache};
use crate::tree::{validate, ActionKind, Tree};

#[derive(Parser)]
#[command(
    name = "spotview",
    version = "1.0.0",
    about = "GTO solution viewer \u{2014} decision-tree navigation, stacks, pot, and strategy payloads."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a tree payload and report every integrity violation
    Validate {
        /// Tree payload (JSON)
        tree: PathBuf,
    },
    /// Show aggregate statistics for a tree payload
    Inspect {
        tree: PathBuf,
    },
    /// Show the breadcrumb trail from the root to a node
    Path {
        tree: PathBuf,
        /// Node id
        node: String,
    },
    /// List the actions available from a node
    Actions {
        tree: PathBuf,
        node: String,
    },
    /// Follow a sequence of action letters from a node (e.g. RCA)
    Walk {
        tree: PathBuf,
        /// Action letters: F=fold, C=call, X=check, R=raise, A=all-in
        path: String,
        /// Starting node (defaults to the root)
        #[arg(short, long)]
        from: Option<String>,
    },
    /// Enumerate terminal nodes reachable from a node
    Terminals {
        tree: PathBuf,
        /// Starting node (defaults to the root)
        #[arg(short, long)]
        from: Option<String>,
    },
    /// Reconstruct stacks, pot, and contributions at a node
    State {
        tree: PathBuf,
        node: String,
        /// Raw settings JSON; absent fields take documented defaults
        #[arg(short, long)]
        settings: Option<PathBuf>,
    },
    /// Show the hand-strategy payload for a node from an archive directory
    Strategy {
        /// Strategy archive root (contains nodes/{id} payloads)
        archive: PathBuf,
        /// Tree payload, used for action labels
        tree: PathBuf,
        node: String,
        /// Spot identifier, display only
        #[arg(long, default_value = "local")]
        spot: String,
        /// Maximum number of hands to list
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Summarize a persisted spot record
    Spot {
        record: PathBuf,
        /// Object-store root; when given, the tree payload is fetched
        /// through it and inspected
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Browse the embedded sample spot
    Demo {
        /// Node to land on (defaults to the root)
        #[arg(short, long)]
        node: Option<String>,
    },
}

pub fn run() {
    let cli = Cli::parse();
    dispatch(cli);
}

pub fn run_with_args(args: Vec<String>) {
    let cli = Cli::parse_from(args);
    dispatch(cli);
}

fn dispatch(cli: Cli) {
    match cli.command {
        Commands::Validate { tree } => cmd_validate(&tree),
        Commands::Inspect { tree } => cmd_inspect(&tree),
        Commands::Path { tree, node } => cmd_path(&tree, &node),
        Commands::Actions { tree, node } => cmd_actions(&tree, &node),
        Commands::Walk { tree, path, from } => cmd_walk(&tree, &path, from.as_deref()),
        Commands::Terminals { tree, from } => cmd_terminals(&tree, from.as_deref()),
        Commands::State {
            tree,
            node,
            settings,
        } => cmd_state(&tree, &node, settings.as_deref()),
        Commands::Strategy {
            archive,
            tree,
            node,
            spot,
            limit,
        } => cmd_strategy(&archive, &tree, &node, &spot, limit),
        Commands::Spot { record, store } => cmd_spot(&record, store.as_deref()),
        Commands::Demo { node } => cmd_demo(node.as_deref()),
    }
}

// ---------------------------------------------------------------------------
// Loading helpers
// ---------------------------------------------------------------------------

fn load_tree(path: &Path) -> Option<Tree> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            print_error(&format!("Cannot read {}: {}", path.display(), e));
            return None;
        }
    };
    match Tree::from_json(&bytes) {
        Ok(tree) => Some(tree),
        Err(e) => {
            print_error(&e.to_string());
            None
        }
    }
}

fn load_navigator(path: &Path) -> Option<TreeNavigator> {
    let tree = load_tree(path)?;
    match TreeNavigator::new(tree) {
        Ok(nav) => Some(nav),
        Err(e) => {
            print_error(&e.to_string());
            None
        }
    }
}

fn load_settings(path: Option<&Path>) -> Option<GameSettings> {
    match path {
        None => Some(normalize_settings(&serde_json::Value::Null)),
        Some(path) => {
            let bytes = match fs::read(path) {
                Ok(b) => b,
                Err(e) => {
                    print_error(&format!("Cannot read {}: {}", path.display(), e));
                    return None;
                }
            };
            match serde_json::from_slice(&bytes) {
                Ok(raw) => Some(normalize_settings(&raw)),
                Err(e) => {
                    print_error(&format!("Invalid settings JSON: {}", e));
                    None
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_validate(path: &Path) {
    let tree = match load_tree(path) {
        Some(t) => t,
        None => return,
    };
    let report = validate(&tree);
    println!();
    if report.valid {
        println!(
            "  {} {} nodes, root '{}'",
            "Valid tree.".green().bold(),
            tree.nodes.len(),
            tree.root,
        );
    } else {
        println!(
            "  {} {} violation(s):",
            "Invalid tree.".red().bold(),
            report.errors.len(),
        );
        for error in &report.errors {
            println!("    - {}", error);
        }
    }
    println!();
}

fn cmd_inspect(path: &Path) {
    let nav = match load_navigator(path) {
        Some(n) => n,
        None => return,
    };
    let stats = nav.statistics();
    println!();
    println!("  {} root '{}'", "Tree".bold(), nav.root_id());
    println!();
    println!("{}", statistics_table(&stats));

    let metadata = &nav.tree().metadata;
    if !metadata.first_decision.is_empty() {
        println!();
        let mut seats: Vec<(&usize, &String)> = metadata.first_decision.iter().collect();
        seats.sort();
        for (player, node) in seats {
            println!("  P{} opens at '{}'", player, node);
        }
    }
    println!();
}

fn cmd_path(path: &Path, node: &str) {
    let nav = match load_navigator(path) {
        Some(n) => n,
        None => return,
    };
    match nav.breadcrumbs(node) {
        Ok(crumbs) => {
            println!();
            println!("  {}", breadcrumb_trail(&crumbs));
            match nav.path_label(node) {
                Ok(label) => println!("  {}", label.dimmed()),
                Err(e) => print_error(&e.to_string()),
            }
            println!();
        }
        Err(e) => print_error(&e.to_string()),
    }
}

fn cmd_actions(path: &Path, node: &str) {
    let nav = match load_navigator(path) {
        Some(n) => n,
        None => return,
    };
    match nav.available_actions(node) {
        Ok(actions) => {
            println!();
            if actions.is_empty() {
                println!("  No onward actions from '{}' \u{2014} play ends here.", node);
            } else {
                println!("{}", actions_table(&actions));
            }
            println!();
        }
        Err(e) => print_error(&e.to_string()),
    }
}

fn parse_action_letters(path: &str) -> Option<Vec<ActionKind>> {
    path.chars()
        .map(|c| {
            let kind = ActionKind::from_letter(c);
            if kind.is_none() {
                print_error(&format!(
                    "Invalid action letter '{}'. Valid: F, C, X, R, A",
                    c
                ));
            }
            kind
        })
        .collect()
}

fn cmd_walk(path: &Path, letters: &str, from: Option<&str>) {
    let nav = match load_navigator(path) {
        Some(n) => n,
        None => return,
    };
    let kinds = match parse_action_letters(letters) {
        Some(k) => k,
        None => return,
    };
    let start = from.unwrap_or(nav.root_id());
    match nav.navigate_by_path(start, &kinds) {
        Ok(node) => {
            println!();
            println!("  Reached '{}'", node.bold());
            match nav.path_label(&node) {
                Ok(label) => println!("  {}", label.dimmed()),
                Err(e) => print_error(&e.to_string()),
            }
            println!();
        }
        Err(e) => print_error(&e.to_string()),
    }
}

fn cmd_terminals(path: &Path, from: Option<&str>) {
    let nav = match load_navigator(path) {
        Some(n) => n,
        None => return,
    };
    let start = from.unwrap_or(nav.root_id());
    match nav.terminal_nodes(start) {
        Ok(terminals) => {
            println!();
            println!(
                "  {} terminal node(s) reachable from '{}':",
                terminals.len().to_string().bold(),
                start,
            );
            for id in &terminals {
                match nav.path_label(id) {
                    Ok(label) => println!("    {}  {}", id.bold(), label.dimmed()),
                    Err(e) => {
                        print_error(&e.to_string());
                        return;
                    }
                }
            }
            println!();
        }
        Err(e) => print_error(&e.to_string()),
    }
}

fn cmd_state(path: &Path, node: &str, settings_path: Option<&Path>) {
    let nav = match load_navigator(path) {
        Some(n) => n,
        None => return,
    };
    let settings = match load_settings(settings_path) {
        Some(s) => s,
        None => return,
    };
    print_state(&nav, &settings, node);
}

fn print_state(nav: &TreeNavigator, settings: &GameSettings, node: &str) {
    let sequence = match action_sequence(nav, node) {
        Ok(s) => s,
        Err(e) => {
            print_error(&e.to_string());
            return;
        }
    };
    let street = match nav.node(node) {
        Ok(n) => n.street,
        Err(e) => {
            print_error(&e.to_string());
            return;
        }
    };

    let mut stacks = Vec::with_capacity(settings.player_count);
    for player in 0..settings.player_count {
        match stack_absolute(player, settings, &sequence) {
            Ok(stack) => stacks.push(stack),
            Err(e) => {
                print_error(&e.to_string());
                return;
            }
        }
    }
    let pot = match pot_and_contributions(settings, &sequence, street) {
        Ok(p) => p,
        Err(e) => {
            print_error(&e.to_string());
            return;
        }
    };

    println!();
    match nav.breadcrumbs(node) {
        Ok(crumbs) => println!("  {}", breadcrumb_trail(&crumbs)),
        Err(e) => {
            print_error(&e.to_string());
            return;
        }
    }
    println!();
    println!("{}", state_table(settings, &stacks, &pot));
    println!();
}

fn cmd_strategy(archive: &Path, tree: &Path, node: &str, spot: &str, limit: usize) {
    let nav = match load_navigator(tree) {
        Some(n) => n,
        None => return,
    };
    let labels: Vec<String> = match nav.node(node) {
        Ok(n) => n
            .actions
            .iter()
            .map(|a| crate::format::action_label(a.kind, a.amount))
            .collect(),
        Err(e) => {
            print_error(&e.to_string());
            return;
        }
    };

    let store = FsObjectStore::new(archive);
    let reader = StrategyArchive::new(spot, Box::new(store));
    match reader.node_strategy(node) {
        Ok(Some(strategy)) => {
            println!();
            println!(
                "  {} node '{}' \u{2014} {} hand(s)",
                reader.spot_id().bold(),
                node,
                strategy.len(),
            );
            println!();
            println!("{}", strategy_rows(&strategy, &labels, limit));
            println!();
        }
        Ok(None) => {
            println!();
            println!("  No strategy payload for node '{}'.", node);
            println!();
        }
        Err(e) => print_error(&e.to_string()),
    }
}

fn cmd_spot(path: &Path, store_root: Option<&Path>) {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            print_error(&format!("Cannot read {}: {}", path.display(), e));
            return;
        }
    };
    let record = match SpotRecord::from_json(&bytes) {
        Ok(r) => r,
        Err(e) => {
            print_error(&e.to_string());
            return;
        }
    };

    println!();
    println!("{}", spot_table(&record));

    let locator = match (&record.tree_locator, record.status.is_ready()) {
        (Some(locator), true) => locator,
        _ => {
            println!();
            return;
        }
    };

    match store_root {
        Some(root) => {
            let cache = TreeCache::new(Box::new(FsObjectStore::new(root)));
            match cache
                .fetch(locator)
                .and_then(|tree| TreeNavigator::new(Tree::clone(&tree)))
            {
                Ok(nav) => {
                    println!();
                    println!("{}", statistics_table(&nav.statistics()));
                }
                Err(e) => print_error(&e.to_string()),
            }
        }
        None => {
            println!();
            println!(
                "  Load the tree with {}",
                format!("spotview inspect {}", locator).bold()
            );
        }
    }
    println!();
}

fn cmd_demo(node: Option<&str>) {
    let nav = match TreeNavigator::new(sample_tree()) {
        Ok(n) => n,
        Err(e) => {
            print_error(&e.to_string());
            return;
        }
    };
    let settings = sample_settings();
    let node = node.unwrap_or(nav.root_id()).to_string();

    println!();
    println!("  {} {}", "Demo:".bold(), sample_name());
    print_state(&nav, &settings, &node);

    match nav.available_actions(&node) {
        Ok(actions) if !actions.is_empty() => {
            println!("{}", actions_table(&actions));
            println!();
        }
        Ok(_) => {
            println!("  No onward actions \u{2014} play ends here.");
            println!();
        }
        Err(e) => print_error(&e.to_string()),
    }
}
