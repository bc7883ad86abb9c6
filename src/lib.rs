//! # queryguard
//!
//! A library for enhancing PromQL, LogQL, and TraceQL queries so that every
//! label selector they contain is provably constrained by a caller's
//! allowed-value map, for use at the edge of a multi-tenant observability
//! proxy.
//!
//! This library provides components for:
//! - **Parsing**: dialect-aware tokenization of label selectors
//! - **Enforcement**: rewriting or rejecting selectors against a constraint map
//! - **Synthesis**: appending selectors for constraints a query didn't mention
//! - **Constraint loading**: YAML-defined, named constraint profiles
//!
//! # Examples
//!
//! ```
//! use queryguard::{enhance, Language};
//! use std::collections::BTreeMap;
//!
//! let mut constraints = BTreeMap::new();
//! constraints.insert("namespace".to_string(), vec!["demo".to_string(), "prod".to_string()]);
//!
//! let result = enhance("up", Language::PromQl, &constraints).unwrap();
//! assert_eq!(result.query, r#"up{namespace=~"demo|prod"}"#);
//! ```

pub mod constraints;
pub mod dialect;
pub mod enhancer;
pub mod error;
pub mod expression;
pub mod normalizer;
pub mod orchestrator;
pub mod parser;
pub mod pattern;
pub mod scanner;
pub mod serializer;
pub mod synthesizer;

pub use constraints::{ConstraintBook, ConstraintMap};
pub use dialect::{syntax_for, Language};
pub use error::{ConstraintBookError, EnhanceError};
pub use expression::{LabelExpression, Operator};
pub use orchestrator::{enhance, EnhancementResult};
