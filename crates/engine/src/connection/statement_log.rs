//! Statement recording decorator.

use super::Connection;
use tablewright_core::EngineResult;
use tracing::debug;

/// Connection decorator that records every executed statement
///
/// In dry-run mode statements are recorded but never sent; catalog queries
/// still reach the database so planning sees the real schema.
#[derive(Debug)]
pub struct StatementLog<C> {
    inner: C,
    statements: Vec<String>,
    dry_run: bool,
}

impl<C: Connection> StatementLog<C> {
    /// Record and execute
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            statements: Vec::new(),
            dry_run: false,
        }
    }

    /// Record only
    pub fn dry_run(inner: C) -> Self {
        Self {
            dry_run: true,
            ..Self::new(inner)
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Statements recorded so far, in order
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Drain the recorded statements
    pub fn take_statements(&mut self) -> Vec<String> {
        std::mem::take(&mut self.statements)
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: Connection> Connection for StatementLog<C> {
    fn driver_name(&self) -> &str {
        self.inner.driver_name()
    }

    fn execute(&mut self, sql: &str) -> EngineResult<()> {
        if self.dry_run {
            debug!(sql, "dry run, statement not executed");
        } else {
            self.inner.execute(sql)?;
        }
        self.statements.push(sql.to_string());
        Ok(())
    }

    fn query_column(&mut self, sql: &str, params: &[String]) -> EngineResult<Vec<String>> {
        self.inner.query_column(sql, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablewright_core::EngineError;

    #[derive(Default)]
    struct Recorder {
        executed: Vec<String>,
        fail: bool,
    }

    impl Connection for Recorder {
        fn driver_name(&self) -> &str {
            "sqlite"
        }

        fn execute(&mut self, sql: &str) -> EngineResult<()> {
            if self.fail {
                return Err(EngineError::ddl(sql, "boom"));
            }
            self.executed.push(sql.to_string());
            Ok(())
        }

        fn query_column(&mut self, _sql: &str, _params: &[String]) -> EngineResult<Vec<String>> {
            Ok(vec!["x".to_string()])
        }
    }

    #[test]
    fn test_records_and_executes() {
        let mut log = StatementLog::new(Recorder::default());
        log.execute("CREATE TABLE a (id integer)").unwrap();

        assert_eq!(log.statements().to_vec(), vec!["CREATE TABLE a (id integer)"]);
        assert_eq!(log.inner().executed.len(), 1);
    }

    #[test]
    fn test_dry_run_does_not_execute() {
        let mut log = StatementLog::dry_run(Recorder::default());
        log.execute("CREATE TABLE a (id integer)").unwrap();

        assert!(log.is_dry_run());
        assert_eq!(log.statements().len(), 1);
        assert!(log.inner().executed.is_empty());
        assert_eq!(log.query_column("SELECT 1", &[]).unwrap(), vec!["x"]);
    }

    #[test]
    fn test_failed_statement_is_not_recorded() {
        let mut log = StatementLog::new(Recorder {
            fail: true,
            ..Default::default()
        });
        assert!(log.execute("CREATE TABLE a (id integer)").is_err());
        assert!(log.take_statements().is_empty());
    }
}
