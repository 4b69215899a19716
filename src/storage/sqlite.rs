//! SQLite storage backend

use super::traits::{NodeFilter, NodeStore, OpenStore, RecordStore, StorageError, StorageResult};
use crate::records::{
    Criticality, InventoryItem, NewInventoryItem, NewWorkOrder, OperationalStatus, StatusCount,
    WorkOrder, DEFAULT_WORK_ORDER_STATUS,
};
use crate::tree::{NewNode, Node, NodeId};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const NODE_COLUMNS: &str = "id, name, kind, description, parent_id";

const WORK_ORDER_COLUMNS: &str = "id, number, title, description, status, criticality, created_at, \
     updated_at, due_date, location_id, assigned_to, created_by";

const INVENTORY_ITEM_COLUMNS: &str = "id, item_number, item_type, serial_number, short_description, \
     detailed_description, operational_status, registered_at, quantity, estimated_price_usd, \
     registered_by, location_id, product_id";

/// SQLite-backed store for nodes, work orders and inventory items
///
/// Uses a single SQLite database file. Thread-safe via internal mutex on the
/// connection; transactions opened with `begin` span every call made until
/// `commit` or `rollback`.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

/// Raw work order columns, converted after the row is released
struct WorkOrderRow {
    id: i64,
    number: String,
    title: String,
    description: String,
    status: String,
    criticality: String,
    created_at: String,
    updated_at: String,
    due_date: Option<String>,
    location_id: i64,
    assigned_to: Option<i64>,
    created_by: i64,
}

/// Raw inventory item columns
struct InventoryItemRow {
    id: i64,
    item_number: String,
    item_type: String,
    serial_number: String,
    short_description: String,
    detailed_description: String,
    operational_status: String,
    registered_at: String,
    quantity: u32,
    estimated_price_usd: f64,
    registered_by: i64,
    location_id: i64,
    product_id: Option<i64>,
}

impl SqliteStore {
    /// Initialize the database schema
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            -- Asset nodes; children are derived through idx_nodes_parent
            CREATE TABLE IF NOT EXISTS nodes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                kind TEXT NOT NULL,
                description TEXT,
                parent_id INTEGER REFERENCES nodes(id)
            );

            CREATE INDEX IF NOT EXISTS idx_nodes_parent
                ON nodes(parent_id);

            -- Sibling names are unique; roots share the pseudo-parent 0
            CREATE UNIQUE INDEX IF NOT EXISTS idx_nodes_sibling_name
                ON nodes(COALESCE(parent_id, 0), name);

            CREATE TABLE IF NOT EXISTS work_orders (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                number TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                status TEXT NOT NULL,
                criticality TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                due_date TEXT,
                location_id INTEGER NOT NULL REFERENCES nodes(id),
                assigned_to INTEGER,
                created_by INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_work_orders_location
                ON work_orders(location_id);
            CREATE INDEX IF NOT EXISTS idx_work_orders_status
                ON work_orders(status);

            CREATE TABLE IF NOT EXISTS inventory_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                item_number TEXT NOT NULL UNIQUE,
                item_type TEXT NOT NULL,
                serial_number TEXT NOT NULL UNIQUE,
                short_description TEXT NOT NULL,
                detailed_description TEXT NOT NULL,
                operational_status TEXT NOT NULL,
                registered_at TEXT NOT NULL,
                quantity INTEGER NOT NULL CHECK (quantity >= 1),
                estimated_price_usd REAL NOT NULL,
                registered_by INTEGER NOT NULL,
                location_id INTEGER NOT NULL REFERENCES nodes(id),
                product_id INTEGER
            );

            CREATE INDEX IF NOT EXISTS idx_inventory_items_location
                ON inventory_items(location_id);

            -- Enable foreign keys
            PRAGMA foreign_keys = ON;

            -- Enable WAL mode for concurrent reads during writes
            PRAGMA journal_mode = WAL;
            "#,
        )?;

        Ok(())
    }

    fn from_connection(conn: Connection) -> StorageResult<Self> {
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    /// Run raw SQL against the connection. Test-only hook for rigging
    /// states the public API refuses to produce.
    #[cfg(test)]
    pub(crate) fn execute_raw(&self, sql: &str) -> StorageResult<()> {
        self.conn()?.execute_batch(sql)?;
        Ok(())
    }

    fn row_to_node(row: &Row<'_>) -> rusqlite::Result<Node> {
        Ok(Node {
            id: NodeId::new(row.get(0)?),
            name: row.get(1)?,
            kind: row.get(2)?,
            description: row.get(3)?,
            parent_id: row.get::<_, Option<i64>>(4)?.map(NodeId::new),
        })
    }

    fn read_work_order(row: &Row<'_>) -> rusqlite::Result<WorkOrderRow> {
        Ok(WorkOrderRow {
            id: row.get(0)?,
            number: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            status: row.get(4)?,
            criticality: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
            due_date: row.get(8)?,
            location_id: row.get(9)?,
            assigned_to: row.get(10)?,
            created_by: row.get(11)?,
        })
    }

    fn read_inventory_item(row: &Row<'_>) -> rusqlite::Result<InventoryItemRow> {
        Ok(InventoryItemRow {
            id: row.get(0)?,
            item_number: row.get(1)?,
            item_type: row.get(2)?,
            serial_number: row.get(3)?,
            short_description: row.get(4)?,
            detailed_description: row.get(5)?,
            operational_status: row.get(6)?,
            registered_at: row.get(7)?,
            quantity: row.get(8)?,
            estimated_price_usd: row.get(9)?,
            registered_by: row.get(10)?,
            location_id: row.get(11)?,
            product_id: row.get(12)?,
        })
    }

    fn load_work_order(conn: &Connection, id: i64) -> StorageResult<Option<WorkOrder>> {
        let sql = format!("SELECT {} FROM work_orders WHERE id = ?1", WORK_ORDER_COLUMNS);
        let row = conn
            .query_row(&sql, params![id], Self::read_work_order)
            .optional()?;
        row.map(WorkOrderRow::into_work_order).transpose()
    }

    fn load_inventory_item(
        conn: &Connection,
        column: &str,
        value: &str,
    ) -> StorageResult<Option<InventoryItem>> {
        let sql = format!(
            "SELECT {} FROM inventory_items WHERE {} = ?1",
            INVENTORY_ITEM_COLUMNS, column
        );
        let row = conn
            .query_row(&sql, params![value], Self::read_inventory_item)
            .optional()?;
        row.map(InventoryItemRow::into_inventory_item).transpose()
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::DateParse(e.to_string()))
}

fn parse_date(raw: &str) -> StorageResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| StorageError::DateParse(e.to_string()))
}

/// Escape LIKE wildcards so user input matches literally
fn like_pattern(fragment: &str) -> String {
    let escaped = fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

impl WorkOrderRow {
    fn into_work_order(self) -> StorageResult<WorkOrder> {
        Ok(WorkOrder {
            id: self.id,
            number: self.number,
            title: self.title,
            description: self.description,
            status: self.status,
            criticality: self
                .criticality
                .parse::<Criticality>()
                .map_err(StorageError::InvalidValue)?,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            due_date: self.due_date.as_deref().map(parse_date).transpose()?,
            location_id: NodeId::new(self.location_id),
            assigned_to: self.assigned_to,
            created_by: self.created_by,
        })
    }
}

impl InventoryItemRow {
    fn into_inventory_item(self) -> StorageResult<InventoryItem> {
        Ok(InventoryItem {
            id: self.id,
            item_number: self.item_number,
            item_type: self.item_type,
            serial_number: self.serial_number,
            short_description: self.short_description,
            detailed_description: self.detailed_description,
            operational_status: self
                .operational_status
                .parse::<OperationalStatus>()
                .map_err(StorageError::InvalidValue)?,
            registered_at: parse_timestamp(&self.registered_at)?,
            quantity: self.quantity,
            estimated_price_usd: self.estimated_price_usd,
            registered_by: self.registered_by,
            location_id: NodeId::new(self.location_id),
            product_id: self.product_id,
        })
    }
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        Self::from_connection(Connection::open(path)?)
    }

    fn open_in_memory() -> StorageResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }
}

impl NodeStore for SqliteStore {
    fn insert_node(&self, node: &NewNode) -> StorageResult<NodeId> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "INSERT INTO nodes (name, kind, description, parent_id) VALUES (?1, ?2, ?3, ?4)",
        )?;
        stmt.execute(params![
            node.name,
            node.kind,
            node.description,
            node.parent_id.map(NodeId::get),
        ])?;
        Ok(NodeId::new(conn.last_insert_rowid()))
    }

    fn get_node(&self, id: NodeId) -> StorageResult<Option<Node>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare_cached(&format!("SELECT {} FROM nodes WHERE id = ?1", NODE_COLUMNS))?;
        Ok(stmt.query_row(params![id.get()], Self::row_to_node).optional()?)
    }

    fn find_nodes(&self, parent_id: Option<NodeId>) -> StorageResult<Vec<Node>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM nodes WHERE parent_id IS ?1 ORDER BY name, id",
            NODE_COLUMNS
        ))?;
        let nodes = stmt
            .query_map(params![parent_id.map(NodeId::get)], Self::row_to_node)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(nodes)
    }

    fn child_ids(&self, parent_id: NodeId) -> StorageResult<Vec<NodeId>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached("SELECT id FROM nodes WHERE parent_id = ?1")?;
        let ids = stmt
            .query_map(params![parent_id.get()], |row| row.get::<_, i64>(0).map(NodeId::new))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    fn search_nodes(&self, filter: &NodeFilter) -> StorageResult<Vec<Node>> {
        let conn = self.conn()?;

        let mut sql = format!("SELECT {} FROM nodes WHERE 1 = 1", NODE_COLUMNS);
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref fragment) = filter.name_contains {
            sql.push_str(" AND name LIKE ? ESCAPE '\\'");
            params_vec.push(Box::new(like_pattern(fragment)));
        }

        if let Some(parent_id) = filter.parent_id {
            sql.push_str(" AND parent_id = ?");
            params_vec.push(Box::new(parent_id.get()));
        }

        if let Some(ref kind) = filter.kind {
            sql.push_str(" AND kind = ?");
            params_vec.push(Box::new(kind.clone()));
        }

        sql.push_str(" ORDER BY name, id");

        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|b| b.as_ref()).collect();
        let nodes = stmt
            .query_map(params_refs.as_slice(), Self::row_to_node)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(nodes)
    }

    fn count_nodes(&self) -> StorageResult<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM nodes", [], |row| row.get(0))?;
        usize::try_from(count).map_err(|e| StorageError::InvalidValue(e.to_string()))
    }

    fn begin(&self) -> StorageResult<()> {
        self.conn()?.execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
    }

    fn commit(&self) -> StorageResult<()> {
        self.conn()?.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&self) -> StorageResult<()> {
        self.conn()?.execute_batch("ROLLBACK")?;
        Ok(())
    }
}

impl RecordStore for SqliteStore {
    fn insert_work_order(&self, number: &str, order: &NewWorkOrder) -> StorageResult<WorkOrder> {
        let conn = self.conn()?;
        let now = format_timestamp(Utc::now());

        conn.execute(
            r#"
            INSERT INTO work_orders (number, title, description, status, criticality, created_at,
                                     updated_at, due_date, location_id, assigned_to, created_by)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                number,
                order.title,
                order.description,
                DEFAULT_WORK_ORDER_STATUS,
                order.criticality.as_str(),
                now,
                order.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
                order.location_id.get(),
                order.assigned_to,
                order.created_by,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::load_work_order(&conn, id)?
            .ok_or_else(|| StorageError::InvalidValue(format!("work order {} vanished after insert", id)))
    }

    fn last_work_order_number(&self) -> StorageResult<Option<String>> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                "SELECT number FROM work_orders ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn get_work_order(&self, id: i64) -> StorageResult<Option<WorkOrder>> {
        let conn = self.conn()?;
        Self::load_work_order(&conn, id)
    }

    fn list_work_orders(&self, status: Option<&str>) -> StorageResult<Vec<WorkOrder>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM work_orders WHERE ?1 IS NULL OR status = ?1 ORDER BY created_at DESC, id DESC",
            WORK_ORDER_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![status], Self::read_work_order)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(WorkOrderRow::into_work_order).collect()
    }

    fn set_work_order_status(&self, id: i64, status: &str) -> StorageResult<Option<WorkOrder>> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE work_orders SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status, format_timestamp(Utc::now()), id],
        )?;
        if updated == 0 {
            return Ok(None);
        }
        Self::load_work_order(&conn, id)
    }

    fn assign_work_order(&self, id: i64, user_id: i64) -> StorageResult<Option<WorkOrder>> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE work_orders SET assigned_to = ?1, updated_at = ?2 WHERE id = ?3",
            params![user_id, format_timestamp(Utc::now()), id],
        )?;
        if updated == 0 {
            return Ok(None);
        }
        Self::load_work_order(&conn, id)
    }

    fn work_order_status_counts(&self) -> StorageResult<Vec<StatusCount>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT status, COUNT(*) FROM work_orders GROUP BY status ORDER BY status",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows
            .into_iter()
            .map(|(status, count)| StatusCount {
                status,
                count: count.max(0) as usize,
            })
            .collect())
    }

    fn insert_inventory_item(
        &self,
        item_number: &str,
        item: &NewInventoryItem,
    ) -> StorageResult<InventoryItem> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO inventory_items (item_number, item_type, serial_number, short_description,
                                         detailed_description, operational_status, registered_at,
                                         quantity, estimated_price_usd, registered_by, location_id,
                                         product_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                item_number,
                item.item_type,
                item.serial_number,
                item.short_description,
                item.detailed_description,
                item.operational_status.as_str(),
                format_timestamp(Utc::now()),
                item.quantity,
                item.estimated_price_usd,
                item.registered_by,
                item.location_id.get(),
                item.product_id,
            ],
        )?;

        Self::load_inventory_item(&conn, "item_number", item_number)?.ok_or_else(|| {
            StorageError::InvalidValue(format!("inventory item {} vanished after insert", item_number))
        })
    }

    fn last_inventory_item_number(&self) -> StorageResult<Option<String>> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                "SELECT item_number FROM inventory_items ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn list_inventory_items(&self, number_contains: Option<&str>) -> StorageResult<Vec<InventoryItem>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM inventory_items WHERE ?1 IS NULL OR item_number LIKE ?1 ESCAPE '\\' \
             ORDER BY registered_at DESC, id DESC",
            INVENTORY_ITEM_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![number_contains.map(like_pattern)], Self::read_inventory_item)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(InventoryItemRow::into_inventory_item).collect()
    }

    fn find_inventory_item(&self, serial_or_number: &str) -> StorageResult<Option<InventoryItem>> {
        let conn = self.conn()?;
        if let Some(item) = Self::load_inventory_item(&conn, "serial_number", serial_or_number)? {
            return Ok(Some(item));
        }
        Self::load_inventory_item(&conn, "item_number", serial_or_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    fn insert(store: &SqliteStore, name: &str, kind: &str, parent: Option<NodeId>) -> NodeId {
        let mut node = NewNode::new(name, kind);
        node.parent_id = parent;
        store.insert_node(&node).unwrap()
    }

    fn sample_order(location_id: NodeId) -> NewWorkOrder {
        NewWorkOrder {
            title: "Cambiar cooler".to_string(),
            description: "Cooler trasero ruidoso".to_string(),
            criticality: Criticality::Alto,
            due_date: NaiveDate::from_ymd_opt(2026, 11, 2),
            location_id,
            created_by: 1,
            assigned_to: None,
        }
    }

    fn sample_item(location_id: NodeId, serial: &str) -> NewInventoryItem {
        NewInventoryItem {
            item_type: "Fuente".to_string(),
            serial_number: serial.to_string(),
            short_description: "PSU APW12".to_string(),
            detailed_description: "Fuente de repuesto".to_string(),
            operational_status: OperationalStatus::Working,
            quantity: 2,
            estimated_price_usd: 150.0,
            registered_by: 1,
            location_id,
            product_id: None,
        }
    }

    #[test]
    fn test_insert_and_get_node() {
        let store = create_test_store();
        let node = NewNode::new("HSY", "HIVE SITE YGUAZU").with_description("Sector principal");
        let id = store.insert_node(&node).unwrap();

        let loaded = store.get_node(id).unwrap().unwrap();
        assert_eq!(loaded.name, "HSY");
        assert_eq!(loaded.kind, "HIVE SITE YGUAZU");
        assert_eq!(loaded.description.as_deref(), Some("Sector principal"));
        assert!(loaded.is_root());

        assert!(store.get_node(NodeId::new(9999)).unwrap().is_none());
    }

    #[test]
    fn test_find_nodes_by_parent() {
        let store = create_test_store();
        let site = insert(&store, "HSY", "Site", None);
        insert(&store, "Deposito", "Centro de Almacenamiento", None);
        insert(&store, "W", "Aereo", Some(site));
        insert(&store, "H", "Hidrocontenedor", Some(site));

        let roots = store.find_nodes(None).unwrap();
        let names: Vec<_> = roots.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Deposito", "HSY"]);

        let children = store.find_nodes(Some(site)).unwrap();
        let names: Vec<_> = children.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["H", "W"]);

        assert_eq!(store.child_ids(site).unwrap().len(), 2);
        assert_eq!(store.count_nodes().unwrap(), 4);
    }

    #[test]
    fn test_duplicate_sibling_name_is_constraint_violation() {
        let store = create_test_store();
        let site = insert(&store, "HSY", "Site", None);
        insert(&store, "W01", "Warehouse", Some(site));

        let err = store
            .insert_node(&NewNode::new("W01", "Warehouse").under(site))
            .unwrap_err();
        assert!(matches!(err, StorageError::ConstraintViolation(_)));

        // Roots are siblings too
        let err = store.insert_node(&NewNode::new("HSY", "Site")).unwrap_err();
        assert!(matches!(err, StorageError::ConstraintViolation(_)));

        // Same name under a different parent is fine
        let other = insert(&store, "Other", "Site", None);
        insert(&store, "W01", "Warehouse", Some(other));
    }

    #[test]
    fn test_missing_parent_is_constraint_violation() {
        let store = create_test_store();
        let err = store
            .insert_node(&NewNode::new("R01", "Rack").under(NodeId::new(77)))
            .unwrap_err();
        assert!(matches!(err, StorageError::ConstraintViolation(_)));
    }

    #[test]
    fn test_rollback_discards_inserts() {
        let store = create_test_store();
        insert(&store, "Keep", "Site", None);

        store.begin().unwrap();
        insert(&store, "Drop", "Site", None);
        assert_eq!(store.count_nodes().unwrap(), 2);
        store.rollback().unwrap();

        assert_eq!(store.count_nodes().unwrap(), 1);

        store.begin().unwrap();
        insert(&store, "Kept", "Site", None);
        store.commit().unwrap();
        assert_eq!(store.count_nodes().unwrap(), 2);
    }

    #[test]
    fn test_search_nodes() {
        let store = create_test_store();
        let rack = insert(&store, "R01", "Rack", None);
        for k in 1..=30 {
            insert(&store, &format!("W01-R01-M{:03}", k), "Minero", Some(rack));
        }
        insert(&store, "w01-notes_x", "Otro", None);

        let hits = store
            .search_nodes(&NodeFilter::new().with_name("m00").with_limit(20))
            .unwrap();
        assert_eq!(hits.len(), 9);

        let limited = store
            .search_nodes(&NodeFilter::new().with_name("W01").with_kind("Minero").with_limit(20))
            .unwrap();
        assert_eq!(limited.len(), 20);
        assert_eq!(limited[0].name, "W01-R01-M001");

        // Wildcards in the query match literally
        let literal = store.search_nodes(&NodeFilter::new().with_name("_x")).unwrap();
        assert_eq!(literal.len(), 1);
        let none = store.search_nodes(&NodeFilter::new().with_name("%")).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_work_order_lifecycle() {
        let store = create_test_store();
        let rack = insert(&store, "R01", "Rack", None);

        assert!(store.last_work_order_number().unwrap().is_none());
        let order = store.insert_work_order("10000", &sample_order(rack)).unwrap();
        assert_eq!(order.number, "10000");
        assert_eq!(order.status, DEFAULT_WORK_ORDER_STATUS);
        assert_eq!(order.due_date, NaiveDate::from_ymd_opt(2026, 11, 2));
        assert_eq!(store.last_work_order_number().unwrap().as_deref(), Some("10000"));

        let updated = store.set_work_order_status(order.id, "Completada").unwrap().unwrap();
        assert_eq!(updated.status, "Completada");
        let assigned = store.assign_work_order(order.id, 7).unwrap().unwrap();
        assert_eq!(assigned.assigned_to, Some(7));
        assert!(store.set_work_order_status(999, "x").unwrap().is_none());

        store.insert_work_order("10001", &sample_order(rack)).unwrap();
        assert_eq!(store.list_work_orders(None).unwrap().len(), 2);
        assert_eq!(store.list_work_orders(Some("Completada")).unwrap().len(), 1);

        let counts = store.work_order_status_counts().unwrap();
        assert_eq!(
            counts,
            vec![
                StatusCount { status: "Completada".to_string(), count: 1 },
                StatusCount { status: "Pendiente".to_string(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_duplicate_work_order_number_is_rejected() {
        let store = create_test_store();
        let rack = insert(&store, "R01", "Rack", None);
        store.insert_work_order("10000", &sample_order(rack)).unwrap();
        let err = store.insert_work_order("10000", &sample_order(rack)).unwrap_err();
        assert!(matches!(err, StorageError::ConstraintViolation(_)));
    }

    #[test]
    fn test_inventory_items() {
        let store = create_test_store();
        let shelf = insert(&store, "E01", "Estante", None);

        let item = store.insert_inventory_item("200000", &sample_item(shelf, "SN-1")).unwrap();
        assert_eq!(item.quantity, 2);
        assert_eq!(item.estimated_value_usd(), 300.0);
        store.insert_inventory_item("200001", &sample_item(shelf, "SN-2")).unwrap();

        let err = store
            .insert_inventory_item("200002", &sample_item(shelf, "SN-1"))
            .unwrap_err();
        assert!(matches!(err, StorageError::ConstraintViolation(_)));

        assert_eq!(store.list_inventory_items(None).unwrap().len(), 2);
        assert_eq!(store.list_inventory_items(Some("0001")).unwrap().len(), 1);

        let by_serial = store.find_inventory_item("SN-2").unwrap().unwrap();
        assert_eq!(by_serial.item_number, "200001");
        let by_number = store.find_inventory_item("200000").unwrap().unwrap();
        assert_eq!(by_number.serial_number, "SN-1");
        assert!(store.find_inventory_item("nope").unwrap().is_none());
        assert_eq!(store.last_inventory_item_number().unwrap().as_deref(), Some("200001"));
    }
}
