use crate::client::KeyValueRecord;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Request sent to the key value service, one per connection.
pub enum Request {
    SetPairs { names: Vec<String>, values: Vec<String> },
    Get { name: String },
    Delete { name: String },
    List,
    SetNested { mapping: Map<String, Value> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Reply from the key value service.
pub enum Response {
    Done,
    Value(String),
    NotFound,
    Pairs(Vec<KeyValueRecord>),
    Summary(String),
    Error(String),
}
