//! asset-tree CLI: location tree, work orders and inventory.
//!
//! Usage:
//!   asset-tree init [--table path] [--dry-run] [--db path]
//!   asset-tree children [--parent id] [--scope all|operational|storage]
//!   asset-tree select --state file.json [--level n --pick id|none] [--reset]
//!   asset-tree order <subcommand>
//!   asset-tree item <subcommand>

use asset_tree::records::{Criticality, NewInventoryItem, NewWorkOrder, OperationalStatus};
use asset_tree::tree::Node;
use asset_tree::{
    default_table, AssetApi, BuildOutcome, NewNode, NodeId, OpenStore, RootScope, SelectorState,
    SqliteStore, TaxonomyBuilder, TaxonomyTable, TreeConfig,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "asset-tree",
    version,
    about = "Hierarchical asset locations, work orders and inventory"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to SQLite database file
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// YAML file with engine settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
    /// More logging (debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the site taxonomy into an empty database
    Init {
        /// Taxonomy table (YAML); the bundled site table when omitted
        #[arg(long)]
        table: Option<PathBuf>,
        /// Expand the table and report its size without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// List the children of a node, or the roots
    Children {
        #[arg(long)]
        parent: Option<NodeId>,
        /// Which roots to list when no parent is given
        #[arg(long, default_value = "all")]
        scope: RootScope,
    },
    /// Print the full path of a node
    Path { id: NodeId },
    /// List the ids of a node and everything below it
    Descendants { id: NodeId },
    /// Show where a node is, splitting off the device for leaf assets
    Locate { id: NodeId },
    /// Find nodes by name
    Search {
        query: String,
        #[arg(long)]
        parent: Option<NodeId>,
        #[arg(long)]
        kind: Option<String>,
    },
    /// Create a single node
    CreateNode {
        #[arg(long)]
        name: String,
        #[arg(long)]
        kind: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        parent: Option<NodeId>,
    },
    /// Drive the cascading location picker through a state file
    Select {
        /// JSON file holding the selector state; created when missing
        #[arg(long)]
        state: PathBuf,
        #[arg(long, default_value = "all")]
        scope: RootScope,
        /// Level to record a pick at
        #[arg(long, requires = "pick")]
        level: Option<usize>,
        /// Node id, or `none` to clear the level
        #[arg(long, requires = "level")]
        pick: Option<String>,
        /// Clear every pick
        #[arg(long, conflicts_with_all = ["level", "pick"])]
        reset: bool,
    },
    /// Manage work orders
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Manage inventory items
    Item {
        #[command(subcommand)]
        action: ItemAction,
    },
    /// Work orders by status and inventory totals
    Report {
        /// Restrict to the subtree under this node
        #[arg(long)]
        location: Option<NodeId>,
    },
}

#[derive(Subcommand)]
enum OrderAction {
    /// Open a work order
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Emergencial, Urgente, Alto, Medio or Bajo
        #[arg(long, default_value = "Medio")]
        criticality: Criticality,
        #[arg(long)]
        location: NodeId,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
        #[arg(long, default_value_t = 0)]
        created_by: i64,
        #[arg(long)]
        assign: Option<i64>,
    },
    /// List work orders
    List {
        #[arg(long)]
        status: Option<String>,
        /// Restrict to the subtree under this node
        #[arg(long)]
        location: Option<NodeId>,
    },
    /// Change the status of a work order
    Status { id: i64, status: String },
    /// Assign a work order to a user
    Assign { id: i64, user: i64 },
}

#[derive(Subcommand)]
enum ItemAction {
    /// Register an inventory item
    Create {
        /// Minero, Cooler, CB, Fuente, Conectores, Carcaza or Otro
        #[arg(long = "type")]
        item_type: String,
        #[arg(long)]
        serial: String,
        #[arg(long)]
        short: String,
        #[arg(long, default_value = "")]
        detailed: String,
        /// Funcionando or "No Funcionando"
        #[arg(long, default_value = "Funcionando")]
        status: OperationalStatus,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
        #[arg(long, default_value_t = 1.0)]
        price: f64,
        #[arg(long)]
        location: NodeId,
        #[arg(long, default_value_t = 0)]
        registered_by: i64,
        #[arg(long)]
        product: Option<i64>,
    },
    /// List inventory items
    List {
        /// Fragment of the item number
        #[arg(long)]
        number: Option<String>,
        /// Restrict to the subtree under this node
        #[arg(long)]
        location: Option<NodeId>,
    },
    /// Show one item by serial number or item number
    Show { key: String },
}

/// Get the default database path (~/.local/share/asset-tree/asset-tree.db)
fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    let app_dir = data_dir.join("asset-tree");
    std::fs::create_dir_all(&app_dir).ok();
    app_dir.join("asset-tree.db")
}

fn init_tracing(verbose: u8) {
    let default = if verbose > 0 { "asset_tree=debug" } else { "asset_tree=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<TreeConfig, String> {
    match path {
        Some(path) => TreeConfig::load(path).map_err(|e| format!("Failed to load config: {}", e)),
        None => Ok(TreeConfig::default()),
    }
}

fn open_store(db: Option<PathBuf>) -> Result<Arc<SqliteStore>, String> {
    let db_path = db.unwrap_or_else(default_db_path);
    let store = SqliteStore::open(&db_path).map_err(|e| format!("Failed to open database: {}", e))?;
    Ok(Arc::new(store))
}

fn print_json<T: Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{}", text);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn fail(e: impl std::fmt::Display) -> i32 {
    eprintln!("Error: {}", e);
    1
}

fn print_nodes(nodes: &[Node]) {
    if nodes.is_empty() {
        println!("No nodes.");
        return;
    }
    println!("{:>8}  {:<24}  {:<26}  {:>8}", "ID", "NAME", "KIND", "PARENT");
    println!("{}", "-".repeat(72));
    for node in nodes {
        let parent = node.parent_id.map(|p| p.to_string()).unwrap_or_default();
        println!("{:>8}  {:<24}  {:<26}  {:>8}", node.id, node.name, node.kind, parent);
    }
}

fn cmd_init(store: Arc<SqliteStore>, table: Option<PathBuf>, dry_run: bool, json: bool) -> i32 {
    let table = match table {
        Some(path) => TaxonomyTable::from_path(&path),
        None => default_table(),
    };
    let table = match table {
        Ok(t) => t,
        Err(e) => return fail(e),
    };

    if dry_run {
        return match table.expand() {
            Ok(plan) if json => print_json(&serde_json::json!({ "planned": plan.len() })),
            Ok(plan) => {
                println!("Table expands to {} nodes", plan.len());
                0
            }
            Err(e) => fail(e),
        };
    }

    match TaxonomyBuilder::new(store).populate(&table) {
        Ok(outcome) if json => print_json(&outcome),
        Ok(BuildOutcome::Populated { nodes }) => {
            println!("Loaded {} nodes", nodes);
            0
        }
        Ok(BuildOutcome::AlreadyPopulated { existing }) => {
            println!("Database already holds {} nodes; nothing loaded", existing);
            0
        }
        Err(e) => fail(e),
    }
}

fn cmd_children(api: &AssetApi, parent: Option<NodeId>, scope: RootScope, json: bool) -> i32 {
    match api.engine().children_of(parent, scope) {
        Ok(nodes) if json => print_json(&nodes),
        Ok(nodes) => {
            print_nodes(&nodes);
            0
        }
        Err(e) => fail(e),
    }
}

fn cmd_path(api: &AssetApi, id: NodeId, json: bool) -> i32 {
    match api.engine().full_path(id) {
        Ok(path) if json => print_json(&serde_json::json!({ "id": id, "path": path })),
        Ok(path) => {
            println!("{}", path);
            0
        }
        Err(e) => fail(e),
    }
}

fn cmd_descendants(api: &AssetApi, id: NodeId, json: bool) -> i32 {
    let mut ids: Vec<NodeId> = match api.engine().descendant_ids(id) {
        Ok(ids) => ids.into_iter().collect(),
        Err(e) => return fail(e),
    };
    ids.sort();
    if json {
        return print_json(&ids);
    }
    println!("{} nodes", ids.len());
    for id in ids {
        println!("{}", id);
    }
    0
}

fn cmd_locate(api: &AssetApi, id: NodeId, json: bool) -> i32 {
    match api.describe_location(id) {
        Ok(display) if json => print_json(&display),
        Ok(display) => {
            println!("Location: {}", display.location_path);
            if let Some(asset) = display.final_asset {
                println!("Asset:    {}", asset);
            }
            0
        }
        Err(e) => fail(e),
    }
}

fn cmd_search(api: &AssetApi, query: &str, parent: Option<NodeId>, kind: Option<&str>, json: bool) -> i32 {
    match api.engine().search(query, parent, kind) {
        Ok(nodes) if json => print_json(&nodes),
        Ok(nodes) => {
            print_nodes(&nodes);
            0
        }
        Err(e) => fail(e),
    }
}

fn cmd_create_node(api: &AssetApi, new: NewNode, json: bool) -> i32 {
    match api.engine().create_node(new) {
        Ok(node) if json => print_json(&node),
        Ok(node) => {
            println!("Created {} ({})", node.label(), node.id);
            0
        }
        Err(e) => fail(e),
    }
}

fn read_state(path: &Path) -> Result<SelectorState, String> {
    match std::fs::read_to_string(path) {
        Ok(text) => serde_json::from_str(&text)
            .map_err(|e| format!("Invalid selector state in '{}': {}", path.display(), e)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SelectorState::default()),
        Err(e) => Err(format!("cannot read '{}': {}", path.display(), e)),
    }
}

fn write_state(path: &Path, state: &SelectorState) -> Result<(), String> {
    let text = serde_json::to_string_pretty(state).map_err(|e| e.to_string())?;
    std::fs::write(path, text).map_err(|e| format!("cannot write '{}': {}", path.display(), e))
}

fn parse_pick(raw: &str) -> Result<Option<NodeId>, String> {
    match raw.trim() {
        "none" | "" => Ok(None),
        id => id.parse().map(Some).map_err(|e| format!("invalid pick '{}': {}", id, e)),
    }
}

fn cmd_select(
    api: &AssetApi,
    state_path: &Path,
    scope: RootScope,
    pick: Option<(usize, String)>,
    reset: bool,
    json: bool,
) -> i32 {
    let mut state = match read_state(state_path) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    let selector = api.selector(scope);

    if reset {
        state.reset();
    }
    if let Some((level, raw)) = pick {
        let pick = match parse_pick(&raw) {
            Ok(p) => p,
            Err(e) => return fail(e),
        };
        selector.pick(&mut state, level, pick);
    }

    let walk = match selector.walk(&state) {
        Ok(w) => w,
        Err(e) => return fail(e),
    };
    walk.resolve(&mut state);
    if let Err(e) = write_state(state_path, &state) {
        return fail(e);
    }

    if json {
        return print_json(&walk);
    }
    for level in &walk.levels {
        println!("Level {}:", level.index + 1);
        for node in &level.options {
            let marker = if level.picked == Some(node.id) { "*" } else { " " };
            println!("  {} {:>8}  {}", marker, node.id, node.label());
        }
    }
    if walk.truncated {
        println!("(maximum depth reached)");
    }
    match walk.final_selection {
        Some(id) => match api.engine().full_path(id) {
            Ok(path) => println!("Selected: {} ({})", path, id),
            Err(e) => return fail(e),
        },
        None => println!("Selected: nothing"),
    }
    0
}

fn cmd_order(api: &AssetApi, action: OrderAction, json: bool) -> i32 {
    match action {
        OrderAction::Create {
            title,
            description,
            criticality,
            location,
            due,
            created_by,
            assign,
        } => {
            let order = NewWorkOrder {
                title,
                description,
                criticality,
                due_date: due,
                location_id: location,
                created_by,
                assigned_to: assign,
            };
            match api.create_work_order(order) {
                Ok(order) if json => print_json(&order),
                Ok(order) => {
                    println!("Created work order {} ({})", order.number, order.criticality);
                    0
                }
                Err(e) => fail(e),
            }
        }
        OrderAction::List { status, location } => {
            let orders = match api.list_work_orders(status.as_deref(), location) {
                Ok(o) => o,
                Err(e) => return fail(e),
            };
            if json {
                return print_json(&orders);
            }
            if orders.is_empty() {
                println!("No work orders.");
                return 0;
            }
            println!("{:>6}  {:<8}  {:<14}  {:<12}  {:<30}", "ID", "NUMBER", "STATUS", "CRITICALITY", "TITLE");
            println!("{}", "-".repeat(78));
            for o in orders {
                println!(
                    "{:>6}  {:<8}  {:<14}  {:<12}  {:<30}",
                    o.id, o.number, o.status, o.criticality, o.title
                );
            }
            0
        }
        OrderAction::Status { id, status } => match api.update_work_order_status(id, &status) {
            Ok(order) if json => print_json(&order),
            Ok(order) => {
                println!("Work order {} is now '{}'", order.number, order.status);
                0
            }
            Err(e) => fail(e),
        },
        OrderAction::Assign { id, user } => match api.assign_work_order(id, user) {
            Ok(order) if json => print_json(&order),
            Ok(order) => {
                println!("Work order {} assigned to user {}", order.number, user);
                0
            }
            Err(e) => fail(e),
        },
    }
}

fn cmd_item(api: &AssetApi, action: ItemAction, json: bool) -> i32 {
    match action {
        ItemAction::Create {
            item_type,
            serial,
            short,
            detailed,
            status,
            quantity,
            price,
            location,
            registered_by,
            product,
        } => {
            let item = NewInventoryItem {
                item_type,
                serial_number: serial,
                short_description: short,
                detailed_description: detailed,
                operational_status: status,
                quantity,
                estimated_price_usd: price,
                registered_by,
                location_id: location,
                product_id: product,
            };
            match api.create_inventory_item(item) {
                Ok(item) if json => print_json(&item),
                Ok(item) => {
                    println!("Registered item {} (serial {})", item.item_number, item.serial_number);
                    0
                }
                Err(e) => fail(e),
            }
        }
        ItemAction::List { number, location } => {
            let items = match api.list_inventory_items(number.as_deref(), location) {
                Ok(i) => i,
                Err(e) => return fail(e),
            };
            if json {
                return print_json(&items);
            }
            if items.is_empty() {
                println!("No inventory items.");
                return 0;
            }
            println!("{:<8}  {:<10}  {:<16}  {:>5}  {:>10}  {:<16}", "NUMBER", "TYPE", "SERIAL", "QTY", "USD", "STATUS");
            println!("{}", "-".repeat(74));
            for i in items {
                println!(
                    "{:<8}  {:<10}  {:<16}  {:>5}  {:>10.2}  {:<16}",
                    i.item_number, i.item_type, i.serial_number, i.quantity, i.estimated_price_usd, i.operational_status
                );
            }
            0
        }
        ItemAction::Show { key } => {
            let item = match api.find_inventory_item(&key) {
                Ok(Some(item)) => item,
                Ok(None) => return fail(format!("no item with serial or number '{}'", key)),
                Err(e) => return fail(e),
            };
            if json {
                return print_json(&item);
            }
            let location = match api.describe_location(item.location_id) {
                Ok(display) => display.location_path,
                Err(e) => return fail(e),
            };
            println!("Item:        {} ({})", item.item_number, item.item_type);
            println!("Serial:      {}", item.serial_number);
            println!("Description: {}", item.short_description);
            println!("Status:      {}", item.operational_status);
            println!("Quantity:    {}", item.quantity);
            println!("Value (USD): {:.2}", item.estimated_value_usd());
            println!("Location:    {}", location);
            0
        }
    }
}

fn cmd_report(api: &AssetApi, location: Option<NodeId>, json: bool) -> i32 {
    let statuses = match api.work_order_status_report(location) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    let inventory = match api.inventory_report(location) {
        Ok(i) => i,
        Err(e) => return fail(e),
    };
    if json {
        return print_json(&serde_json::json!({
            "work_orders": statuses,
            "inventory": inventory,
        }));
    }

    if let Some(id) = location {
        match api.engine().full_path(id) {
            Ok(path) => println!("Location: {}", path),
            Err(e) => return fail(e),
        }
    }
    println!("Work orders by status:");
    if statuses.is_empty() {
        println!("  (none)");
    }
    for row in &statuses {
        println!("  {:<20} {:>6}", row.status, row.count);
    }
    println!(
        "Inventory: {} items, {} units, {:.2} USD",
        inventory.items, inventory.units, inventory.value_usd
    );
    0
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let store = match open_store(cli.db) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let api = AssetApi::with_config(store.clone(), config);
    let json = cli.json;

    let code = match cli.command {
        Commands::Init { table, dry_run } => cmd_init(store, table, dry_run, json),
        Commands::Children { parent, scope } => cmd_children(&api, parent, scope, json),
        Commands::Path { id } => cmd_path(&api, id, json),
        Commands::Descendants { id } => cmd_descendants(&api, id, json),
        Commands::Locate { id } => cmd_locate(&api, id, json),
        Commands::Search { query, parent, kind } => cmd_search(&api, &query, parent, kind.as_deref(), json),
        Commands::CreateNode {
            name,
            kind,
            description,
            parent,
        } => {
            let new = NewNode {
                name,
                kind,
                description,
                parent_id: parent,
            };
            cmd_create_node(&api, new, json)
        }
        Commands::Select {
            state,
            scope,
            level,
            pick,
            reset,
        } => cmd_select(&api, &state, scope, level.zip(pick), reset, json),
        Commands::Order { action } => cmd_order(&api, action, json),
        Commands::Item { action } => cmd_item(&api, action, json),
        Commands::Report { location } => cmd_report(&api, location, json),
    };
    std::process::exit(code);
}
