//! # Migration Orchestrator
//!
//! The [`Migrator`] is the top-level entry point. It walks a [`ResourceSet`]
//! in registration order and, for each resource:
//!
//! ```text
//! resource
//!    │
//!    ├── model?  ──► ModelMigrator::migrate_model()
//!    └── none    ──► TableSynthesizer::synthesize()
//!    │
//!    ▼
//! ConstraintPlanner::apply_resource()   (indexes, pivot tables)
//! ```
//!
//! Processing is sequential and stops at the first failure, which is returned
//! wrapped with the failing resource's slug. Resources before it stay
//! migrated; there is no rollback. Re-running converges because every step
//! checks the catalog first.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tablewright_engine::{Migrator, SqliteConnection};
//!
//! let conn = SqliteConnection::open("app.db")?;
//! let report = Migrator::new(conn).migrate(&resources)?;
//! println!("{}", report.summary());
//! ```

use crate::catalog::{Catalog, CatalogState};
use crate::config::MigratorConfig;
use crate::connection::{Connection, StatementLog, detect_dialect};
use crate::constraints::{ConstraintPlanner, check_index_names};
use crate::dialect::{SqlDialect, dialect_for};
use crate::model::ModelMigrator;
use crate::report::{MigrationPath, MigrationReport, ResourceReport};
use crate::synthesizer::TableSynthesizer;
use chrono::Utc;
use std::collections::HashMap;
use tablewright_core::{Dialect, EngineError, EngineResult};
use tablewright_ir::{ResourceDescriptor, ResourceSet};
use tracing::{debug, info};

// ============================================================================
// Migrator
// ============================================================================

/// Drives a migration run over one caller-owned connection
pub struct Migrator<C: Connection> {
    conn: StatementLog<C>,
    dialect: &'static dyn SqlDialect,
    config: MigratorConfig,
    models: HashMap<String, Box<dyn ModelMigrator>>,
}

impl<C: Connection> Migrator<C> {
    // ====================================================================
    // Construction
    // ====================================================================

    /// Create a migrator with default configuration
    pub fn new(conn: C) -> Self {
        Self::with_config(conn, MigratorConfig::default())
    }

    /// Create a migrator; the dialect is detected unless configured
    pub fn with_config(conn: C, config: MigratorConfig) -> Self {
        let dialect = config.dialect.unwrap_or_else(|| detect_dialect(&conn));
        let conn = if config.dry_run {
            StatementLog::dry_run(conn)
        } else {
            StatementLog::new(conn)
        };

        debug!(dialect = dialect.as_str(), dry_run = config.dry_run, "migrator ready");

        Self {
            conn,
            dialect: dialect_for(dialect),
            config,
            models: HashMap::new(),
        }
    }

    /// Register the migrator for a backing model
    pub fn register_model(
        &mut self,
        model: impl Into<String>,
        migrator: impl ModelMigrator + 'static,
    ) -> &mut Self {
        self.models.insert(model.into(), Box::new(migrator));
        self
    }

    /// Register a model migrator, builder style
    pub fn with_model(mut self, model: impl Into<String>, migrator: impl ModelMigrator + 'static) -> Self {
        self.register_model(model, migrator);
        self
    }

    // ====================================================================
    // Accessors
    // ====================================================================

    pub fn dialect(&self) -> Dialect {
        self.dialect.dialect()
    }

    pub fn config(&self) -> &MigratorConfig {
        &self.config
    }

    /// Every statement issued by this migrator so far
    pub fn statements(&self) -> &[String] {
        self.conn.statements()
    }

    pub fn connection(&self) -> &C {
        self.conn.inner()
    }

    pub fn connection_mut(&mut self) -> &mut C {
        self.conn.inner_mut()
    }

    pub fn into_connection(self) -> C {
        self.conn.into_inner()
    }

    // ====================================================================
    // Migration
    // ====================================================================

    /// Migrate every resource in order
    ///
    /// # Errors
    ///
    /// The first failure, wrapped in [`EngineError::Resource`] with the slug of
    /// the failing resource. Later resources are not attempted.
    pub fn migrate(&mut self, resources: &ResourceSet) -> EngineResult<MigrationReport> {
        let started_at = Utc::now();
        let dry_run = self.config.dry_run;

        info!(
            resources = resources.len(),
            dialect = self.dialect.name(),
            dry_run,
            "starting migration"
        );

        let Self {
            conn,
            dialect,
            config,
            models,
        } = self;
        let dialect: &'static dyn SqlDialect = *dialect;
        let synthesizer = TableSynthesizer::new(dialect, config);
        check_index_names(resources, dialect)?;

        let mut reports = Vec::with_capacity(resources.len());
        let mut state = if dry_run {
            CatalogState::dry_run()
        } else {
            CatalogState::live()
        };

        for resource in resources {
            let first_statement = conn.statements().len();
            let mut catalog = Catalog::with_state(&mut *conn, dialect, state);

            let path = migrate_resource(&mut catalog, &synthesizer, models, resource)
                .map_err(|e| EngineError::in_resource(&resource.slug, e))?;

            let changes = catalog.take_changes();
            state = catalog.into_state();

            info!(
                slug = %resource.slug,
                table = resource.table_name(),
                path = %path,
                tables = changes.tables_created,
                columns = changes.columns_added,
                indexes = changes.indexes_created,
                pivots = changes.pivot_tables_created,
                "resource migrated"
            );

            reports.push(ResourceReport {
                slug: resource.slug.clone(),
                table: resource.table_name().to_string(),
                path,
                changes,
                statements: conn.statements()[first_statement..].to_vec(),
            });
        }

        let report = MigrationReport {
            dialect: dialect.dialect(),
            dry_run,
            resources: reports,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            statements = report.statement_count(),
            elapsed_ms = report.duration().num_milliseconds(),
            "migration complete"
        );

        Ok(report)
    }
}

/// Migrate one resource; errors are returned unwrapped
fn migrate_resource(
    catalog: &mut Catalog<'_>,
    synthesizer: &TableSynthesizer<'_>,
    models: &mut HashMap<String, Box<dyn ModelMigrator>>,
    resource: &ResourceDescriptor,
) -> EngineResult<MigrationPath> {
    let path = match &resource.model {
        Some(model) => {
            let migrator = models
                .get_mut(&model.name)
                .ok_or_else(|| EngineError::MissingModelMigrator(model.name.clone()))?;
            debug!(slug = %resource.slug, model = %model.name, "delegating to model migrator");
            migrator
                .migrate_model(model, resource, catalog.connection())
                .map_err(|e| match e {
                    EngineError::ModelMigration { .. } => e,
                    other => EngineError::model(&model.name, other.to_string()),
                })?;
            MigrationPath::Model
        }
        None => {
            synthesizer.synthesize(catalog, resource)?;
            MigrationPath::Schemaless
        }
    };

    ConstraintPlanner::new(catalog).apply_resource(resource)?;
    Ok(path)
}

impl<C: Connection> std::fmt::Debug for Migrator<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migrator")
            .field("dialect", &self.dialect.name())
            .field("config", &self.config)
            .field("models", &self.models.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Migrate resources on a connection with default configuration
pub fn migrate<C: Connection>(conn: C, resources: &ResourceSet) -> EngineResult<MigrationReport> {
    Migrator::new(conn).migrate(resources)
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use crate::connection::SqliteConnection;
    use crate::model::StatementMigrator;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;
    use tablewright_ir::{DefaultValue, FieldDescriptor, ModelHandle, RelationshipDescriptor};

    fn migrator() -> Migrator<SqliteConnection> {
        Migrator::new(SqliteConnection::open_in_memory().unwrap())
    }

    fn names(m: &Migrator<SqliteConnection>, kind: &str) -> Vec<String> {
        let mut stmt = m
            .connection()
            .inner()
            .prepare("SELECT name FROM sqlite_master WHERE type = ?1 AND name NOT LIKE 'sqlite_%' ORDER BY name")
            .unwrap();
        stmt.query_map([kind], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap()
    }

    fn columns(m: &Migrator<SqliteConnection>, table: &str) -> Vec<String> {
        let mut stmt = m
            .connection()
            .inner()
            .prepare("SELECT name FROM pragma_table_info(?1)")
            .unwrap();
        stmt.query_map([table], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap()
    }

    fn tags_and_posts() -> ResourceSet {
        ResourceSet::from_resources(vec![
            ResourceDescriptor::new("tags").field(FieldDescriptor::text("name").unique()),
            ResourceDescriptor::new("posts")
                .field(FieldDescriptor::text("title").required())
                .relationship(RelationshipDescriptor::belongs_to_many(
                    "tags", "tags", "post_tags", "post_id", "tag_id",
                )),
        ])
        .unwrap()
    }

    fn users_and_roles() -> ResourceSet {
        ResourceSet::from_resources(vec![
            ResourceDescriptor::new("users").relationship(RelationshipDescriptor::belongs_to_many(
                "roles", "roles", "user_roles", "user_id", "role_id",
            )),
            ResourceDescriptor::new("roles").relationship(RelationshipDescriptor::belongs_to_many(
                "users", "users", "user_roles", "role_id", "user_id",
            )),
        ])
        .unwrap()
    }

    struct Counting(Rc<Cell<usize>>);

    impl ModelMigrator for Counting {
        fn migrate_model(
            &mut self,
            _model: &ModelHandle,
            _resource: &ResourceDescriptor,
            _conn: &mut dyn Connection,
        ) -> EngineResult<()> {
            self.0.set(self.0.get() + 1);
            Ok(())
        }
    }

    struct Failing;

    impl ModelMigrator for Failing {
        fn migrate_model(
            &mut self,
            model: &ModelHandle,
            _resource: &ResourceDescriptor,
            _conn: &mut dyn Connection,
        ) -> EngineResult<()> {
            Err(EngineError::model(&model.name, "table definition rejected"))
        }
    }

    #[test]
    fn test_tags_posts_and_pivot() {
        let mut m = migrator();
        assert_eq!(m.dialect(), Dialect::Sqlite);

        let report = m.migrate(&tags_and_posts()).unwrap();

        assert_eq!(names(&m, "table"), vec!["post_tags", "posts", "tags"]);
        assert_eq!(
            names(&m, "index"),
            vec!["idx_post_tags_post_id", "idx_post_tags_tag_id", "uniq_tags_name"]
        );

        let totals = report.totals();
        assert_eq!(totals.tables_created, 2);
        assert_eq!(totals.pivot_tables_created, 1);
        assert_eq!(totals.indexes_created, 3);
        assert_eq!(totals.columns_added, 0);

        let tags = report.resource("tags").unwrap();
        assert_eq!(tags.path, MigrationPath::Schemaless);
        assert_eq!(tags.statements.len(), 2);
        assert!(tags.statements[0].starts_with("CREATE TABLE IF NOT EXISTS \"tags\""));

        assert_eq!(
            columns(&m, "tags"),
            vec!["id", "name", "created_at", "updated_at", "deleted_at"]
        );
    }

    #[test]
    fn test_second_run_converges() {
        let mut m = migrator();
        let resources = tags_and_posts();

        assert!(!m.migrate(&resources).unwrap().is_converged());
        let issued = m.statements().len();

        let again = m.migrate(&resources).unwrap();
        assert!(again.is_converged());
        assert!(again.totals().is_empty());
        assert_eq!(m.statements().len(), issued);
    }

    #[test]
    fn test_new_field_is_added_not_recreated() {
        let mut m = migrator();
        m.migrate(&tags_and_posts()).unwrap();

        let extended = ResourceSet::from_resources(vec![
            ResourceDescriptor::new("tags")
                .field(FieldDescriptor::text("name").unique())
                .field(FieldDescriptor::text("slug").filterable()),
        ])
        .unwrap();
        let report = m.migrate(&extended).unwrap();

        let tags = report.resource("tags").unwrap();
        assert_eq!(tags.changes.tables_created, 0);
        assert_eq!(tags.changes.columns_added, 1);
        assert_eq!(tags.changes.indexes_created, 1);
        assert!(tags.statements[0].starts_with("ALTER TABLE \"tags\" ADD COLUMN \"slug\""));
        assert!(columns(&m, "tags").contains(&"slug".to_string()));
        assert!(names(&m, "index").contains(&"idx_tags_slug".to_string()));
    }

    #[test]
    fn test_belongs_to_adds_indexed_singular_column() {
        let mut m = migrator();
        let resources = ResourceSet::from_resources(vec![
            ResourceDescriptor::new("organizations").field(FieldDescriptor::text("name")),
            ResourceDescriptor::new("projects").relationship(RelationshipDescriptor::belongs_to(
                "organization",
                "organizations",
            )),
        ])
        .unwrap();

        m.migrate(&resources).unwrap();

        assert!(columns(&m, "projects").contains(&"organization_id".to_string()));
        assert!(names(&m, "index").contains(&"idx_projects_organization_id".to_string()));
    }

    #[test]
    fn test_pivot_declared_from_both_sides_is_created_once() {
        let mut m = migrator();
        let report = m.migrate(&users_and_roles()).unwrap();

        assert_eq!(report.totals().pivot_tables_created, 1);
        assert_eq!(report.resource("users").unwrap().changes.pivot_tables_created, 1);
        assert_eq!(report.resource("roles").unwrap().changes.pivot_tables_created, 0);
        assert_eq!(
            names(&m, "index"),
            vec!["idx_user_roles_role_id", "idx_user_roles_user_id"]
        );
    }

    #[test]
    fn test_model_resources_are_delegated() {
        let resources = ResourceSet::from_resources(vec![
            ResourceDescriptor::new("accounts")
                .with_model(ModelHandle::new("Account"))
                .field(FieldDescriptor::text("email").unique()),
        ])
        .unwrap();

        let mut m = migrator().with_model(
            "Account",
            StatementMigrator::new([
                "CREATE TABLE IF NOT EXISTS accounts (id integer primary key, email text)",
            ]),
        );
        let report = m.migrate(&resources).unwrap();

        let accounts = report.resource("accounts").unwrap();
        assert_eq!(accounts.path, MigrationPath::Model);
        assert_eq!(accounts.statements.len(), 2);
        assert_eq!(columns(&m, "accounts"), vec!["id", "email"]);
        assert_eq!(names(&m, "index"), vec!["uniq_accounts_email"]);
    }

    #[test]
    fn test_first_failure_stops_the_run() {
        let after = Rc::new(Cell::new(0));
        let resources = ResourceSet::from_resources(vec![
            ResourceDescriptor::new("alphas").field(FieldDescriptor::text("name")),
            ResourceDescriptor::new("betas").with_model(ModelHandle::new("Beta")),
            ResourceDescriptor::new("gammas").with_model(ModelHandle::new("Gamma")),
        ])
        .unwrap();

        let mut m = migrator()
            .with_model("Beta", Failing)
            .with_model("Gamma", Counting(Rc::clone(&after)));
        let err = m.migrate(&resources).unwrap_err();

        assert_eq!(err.resource_slug(), Some("betas"));
        assert!(matches!(err.root(), EngineError::ModelMigration { .. }));
        assert_eq!(after.get(), 0);
        assert_eq!(names(&m, "table"), vec!["alphas"]);
    }

    #[test]
    fn test_missing_model_migrator_is_a_configuration_error() {
        let resources = ResourceSet::from_resources(vec![
            ResourceDescriptor::new("invoices").with_model(ModelHandle::new("Invoice")),
        ])
        .unwrap();

        let err = migrator().migrate(&resources).unwrap_err();
        assert_eq!(err.resource_slug(), Some("invoices"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_colliding_index_names_fail_before_any_ddl() {
        let resources = ResourceSet::from_resources(vec![
            ResourceDescriptor::new("user").field(FieldDescriptor::text("roles_name").sortable()),
            ResourceDescriptor::new("user_roles").field(FieldDescriptor::text("name").sortable()),
        ])
        .unwrap();

        let mut m = migrator();
        let err = m.migrate(&resources).unwrap_err();

        assert!(err.is_configuration());
        assert!(err.to_string().contains("idx_user_roles_name"));
        assert!(m.statements().is_empty());
        assert!(names(&m, "table").is_empty());
    }

    #[test]
    fn test_now_default_added_to_populated_table() {
        let mut m = migrator();
        let events = ResourceDescriptor::new("events").field(FieldDescriptor::text("name"));
        m.migrate(&ResourceSet::from_resources(vec![events.clone()]).unwrap())
            .unwrap();
        m.connection()
            .inner()
            .execute("INSERT INTO events (name) VALUES ('boot')", [])
            .unwrap();

        let extended = ResourceSet::from_resources(vec![events.field(
            FieldDescriptor::date_time("happened_at")
                .required()
                .with_default(DefaultValue::Now),
        )])
        .unwrap();
        let report = m.migrate(&extended).unwrap();

        let resource = report.resource("events").unwrap();
        assert_eq!(resource.changes.columns_added, 1);
        assert_eq!(
            resource.statements,
            vec!["ALTER TABLE \"events\" ADD COLUMN \"happened_at\" datetime".to_string()]
        );
        assert!(columns(&m, "events").contains(&"happened_at".to_string()));

        let rows: i64 = m
            .connection()
            .inner()
            .query_row("SELECT COUNT(*) FROM events WHERE happened_at IS NULL", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);

        assert!(m.migrate(&extended).unwrap().is_converged());
    }

    #[test]
    fn test_dry_run_leaves_database_untouched() {
        let config = MigratorConfig::default().dry_run();
        let mut m = Migrator::with_config(SqliteConnection::open_in_memory().unwrap(), config);

        let report = m.migrate(&users_and_roles()).unwrap();

        assert!(report.dry_run);
        assert!(names(&m, "table").is_empty());
        assert_eq!(report.totals().tables_created, 2);
        assert_eq!(
            report
                .statements()
                .filter(|s| s.starts_with("CREATE TABLE IF NOT EXISTS \"user_roles\""))
                .count(),
            1
        );
    }
}
