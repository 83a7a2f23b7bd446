pub mod campaign;
pub mod completions;
pub mod graph;
pub mod ledger;
pub mod regions;
pub mod run;
pub mod source;
