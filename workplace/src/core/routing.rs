//! Static routing tables for the setup and review graphs.

use serde::Serialize;

use crate::core::types::SecurityStatus;

/// Transition out of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next<N> {
    Node(N),
    End,
}

/// Nodes of the setup graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupNode {
    Manager,
    Devops,
}

impl SetupNode {
    pub const ENTRY: SetupNode = SetupNode::Manager;

    pub fn next(self) -> Next<SetupNode> {
        match self {
            SetupNode::Manager => Next::Node(SetupNode::Devops),
            SetupNode::Devops => Next::End,
        }
    }
}

/// Nodes of the review graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewNode {
    Security,
    SeniorDev,
}

impl ReviewNode {
    pub const ENTRY: ReviewNode = ReviewNode::Security;

    /// Transition out of `self` given the verdict recorded in state.
    pub fn next(self, status: SecurityStatus) -> Next<ReviewNode> {
        match self {
            ReviewNode::Security => route_security(status),
            ReviewNode::SeniorDev => Next::End,
        }
    }
}

/// Blocked reviews stop at the scanner; clean ones go to the reviewer.
pub fn route_security(status: SecurityStatus) -> Next<ReviewNode> {
    match status {
        SecurityStatus::Blocked => Next::End,
        SecurityStatus::Clean => Next::Node(ReviewNode::SeniorDev),
    }
}
