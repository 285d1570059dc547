//! # Mock Gateway
//!
//! `MockGateway` implements [`Gateway`] from a queue of expectations. Each request pops the
//! next expectation, checks that the operation and table line up, records what was sent and
//! answers with the configured result.
//!
//! | Feature | MockGateway | MemoryBackend |
//! |---------|-------------|---------------|
//! | **State** | None (expectations) | Real tables |
//! | **Assertions** | Exact request bodies | Resulting rows |
//! | **Error Injection** | Any `GatewayError`, per call | Per table |
//! | **Use Case** | Unit testing command/query logic | Sync and end-to-end tests |
//!
//! ```ignore
//! let gateway = Arc::new(MockGateway::new());
//! gateway.expect_insert("years").return_ok(json!({"id": "y1", "name": "Year 1"}));
//! // exercise code holding `gateway.clone() as Arc<dyn Gateway>`
//! gateway.verify();
//! ```

use crate::gateway::memory::Operation;
use crate::gateway::{Embed, Filter, Gateway, GatewayError, Select};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

enum Expectation {
    Select {
        table: String,
        response: Result<Vec<Value>, GatewayError>,
    },
    Insert {
        table: String,
        response: Result<Value, GatewayError>,
    },
    Update {
        table: String,
        id: String,
        response: Result<Value, GatewayError>,
    },
    Delete {
        table: String,
        response: Result<(), GatewayError>,
    },
    Rpc {
        function: String,
        response: Result<Value, GatewayError>,
    },
}

/// A request as the mock received it.
#[derive(Debug, Clone, PartialEq)]
pub struct Received {
    pub operation: Operation,
    pub target: String,
    pub body: Value,
    pub filters: Vec<Filter>,
}

type Queue = Arc<Mutex<VecDeque<Expectation>>>;

#[derive(Default)]
pub struct MockGateway {
    expectations: Queue,
    received: Mutex<Vec<Received>>,
}

/// Completes an expectation with the value the mock should answer.
pub struct ExpectationBuilder<T> {
    expectations: Queue,
    make: Box<dyn FnOnce(Result<T, GatewayError>) -> Expectation + Send>,
}

impl<T> ExpectationBuilder<T> {
    pub fn return_ok(self, value: T) {
        let expectation = (self.make)(Ok(value));
        self.expectations.lock().unwrap().push_back(expectation);
    }

    pub fn return_err(self, error: GatewayError) {
        let expectation = (self.make)(Err(error));
        self.expectations.lock().unwrap().push_back(expectation);
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn builder<T>(
        &self,
        make: impl FnOnce(Result<T, GatewayError>) -> Expectation + Send + 'static,
    ) -> ExpectationBuilder<T> {
        ExpectationBuilder {
            expectations: self.expectations.clone(),
            make: Box::new(make),
        }
    }

    pub fn expect_select(&self, table: &str) -> ExpectationBuilder<Vec<Value>> {
        let table = table.to_string();
        self.builder(move |response| Expectation::Select { table, response })
    }

    pub fn expect_insert(&self, table: &str) -> ExpectationBuilder<Value> {
        let table = table.to_string();
        self.builder(move |response| Expectation::Insert { table, response })
    }

    pub fn expect_update(&self, table: &str, id: &str) -> ExpectationBuilder<Value> {
        let table = table.to_string();
        let id = id.to_string();
        self.builder(move |response| Expectation::Update {
            table,
            id,
            response,
        })
    }

    pub fn expect_delete(&self, table: &str) -> ExpectationBuilder<()> {
        let table = table.to_string();
        self.builder(move |response| Expectation::Delete { table, response })
    }

    pub fn expect_rpc(&self, function: &str) -> ExpectationBuilder<Value> {
        let function = function.to_string();
        self.builder(move |response| Expectation::Rpc { function, response })
    }

    /// Every request received so far, in order.
    pub fn received(&self) -> Vec<Received> {
        self.received.lock().unwrap().clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }

    fn next(&self, received: Received) -> Expectation {
        let expectation = self.expectations.lock().unwrap().pop_front();
        let description = format!("{:?} {}", received.operation, received.target);
        self.received.lock().unwrap().push(received);
        match expectation {
            Some(expectation) => expectation,
            None => panic!("Unexpected request: {description}"),
        }
    }
}

fn mismatch(description: &str) -> ! {
    panic!("Unexpected request or expectation mismatch: {description}")
}

#[async_trait]
impl Gateway for MockGateway {
    async fn select(&self, query: &Select) -> Result<Vec<Value>, GatewayError> {
        let expectation = self.next(Received {
            operation: Operation::Select,
            target: query.table.to_string(),
            body: Value::Null,
            filters: query.filters.clone(),
        });
        match expectation {
            Expectation::Select { table, response } if table == query.table => response,
            _ => mismatch(&format!("select {}", query.table)),
        }
    }

    async fn insert(
        &self,
        table: &str,
        row: Value,
        _embeds: &[Embed],
    ) -> Result<Value, GatewayError> {
        let expectation = self.next(Received {
            operation: Operation::Insert,
            target: table.to_string(),
            body: row,
            filters: Vec::new(),
        });
        match expectation {
            Expectation::Insert {
                table: expected,
                response,
            } if expected == table => response,
            _ => mismatch(&format!("insert {table}")),
        }
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        patch: Value,
        _embeds: &[Embed],
    ) -> Result<Value, GatewayError> {
        let expectation = self.next(Received {
            operation: Operation::Update,
            target: table.to_string(),
            body: patch,
            filters: vec![Filter::eq("id", id)],
        });
        match expectation {
            Expectation::Update {
                table: expected,
                id: expected_id,
                response,
            } if expected == table && expected_id == id => response,
            _ => mismatch(&format!("update {table} {id}")),
        }
    }

    async fn delete_where(&self, table: &str, filters: &[Filter]) -> Result<(), GatewayError> {
        let expectation = self.next(Received {
            operation: Operation::Delete,
            target: table.to_string(),
            body: Value::Null,
            filters: filters.to_vec(),
        });
        match expectation {
            Expectation::Delete {
                table: expected,
                response,
            } if expected == table => response,
            _ => mismatch(&format!("delete {table}")),
        }
    }

    async fn rpc(&self, function: &str, args: Value) -> Result<Value, GatewayError> {
        let expectation = self.next(Received {
            operation: Operation::Rpc,
            target: function.to_string(),
            body: args,
            filters: Vec::new(),
        });
        match expectation {
            Expectation::Rpc {
                function: expected,
                response,
            } if expected == function => response,
            _ => mismatch(&format!("rpc {function}")),
        }
    }
}
