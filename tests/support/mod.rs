//! Shared scaffolding for integration tests: a closed-form [`Kernel`] test
//! double plus a small [`ParseNode`] builder, since this crate has no parser
//! of its own (parsing is an external-collaborator concern) and tests must
//! construct trees by hand against the documented parse-tree contract.

pub mod build;
pub mod mock_kernel;
