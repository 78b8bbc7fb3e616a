use crate::cmd::{Request, Response};
use crate::error::KvsError;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::Write;
use std::net::{Shutdown, SocketAddrV4, TcpStream};

/// A `(name, value)` pair as listed by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValueRecord {
    pub name: String,
    pub value: String,
}

impl KeyValueRecord {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Outcome of a call the service may answer without a value.
///
/// Transport and authorization faults are not represented here; they come
/// back as the `Err` side of the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<T> {
    Found(T),
    NotFound,
    /// The service answered with an error message.
    Failed(String),
}

/// The operations the key value commands need from an API client.
pub trait KvClient {
    fn set_key_value_pairs(&mut self, names: Vec<String>, values: Vec<String>)
        -> Result<Reply<()>>;

    fn get_key_value(&mut self, name: &str) -> Result<Reply<String>>;

    fn delete_key_value(&mut self, name: &str) -> Result<Reply<()>>;

    fn list_key_values(&mut self) -> Result<Vec<KeyValueRecord>>;

    /// Stores every leaf of `mapping`, returning the service's summary.
    fn set_key_value_pairs_from_nested_dict(&mut self, mapping: Map<String, Value>)
        -> Result<String>;
}

/// Simple single-threaded tcp client, one connection per request.
///
/// No authentication or session handling; it speaks the `cmd` wire types only.
pub struct TcpClient {
    addr: SocketAddrV4,
}

impl TcpClient {
    pub fn new(addr: SocketAddrV4) -> Self {
        Self { addr }
    }

    fn call(&self, request: &Request) -> Result<Response> {
        debug!("sending {:?} to {}", request, self.addr);
        let mut stream = TcpStream::connect(self.addr)?;

        stream.write_all(&serde_json::to_vec(request)?)?;
        stream.shutdown(Shutdown::Write)?;

        let response = serde_json::from_reader(stream)?;
        debug!("received {:?}", response);
        Ok(response)
    }

    fn unit_reply(&self, request: Request, op: &'static str) -> Result<Reply<()>> {
        match self.call(&request)? {
            Response::Done => Ok(Reply::Found(())),
            Response::NotFound => Ok(Reply::NotFound),
            Response::Error(e) => Ok(Reply::Failed(e)),
            _ => Err(KvsError::UnexpectedResponse(op).into()),
        }
    }
}

impl KvClient for TcpClient {
    fn set_key_value_pairs(
        &mut self,
        names: Vec<String>,
        values: Vec<String>,
    ) -> Result<Reply<()>> {
        self.unit_reply(Request::SetPairs { names, values }, "set")
    }

    fn get_key_value(&mut self, name: &str) -> Result<Reply<String>> {
        match self.call(&Request::Get {
            name: name.to_string(),
        })? {
            Response::Value(value) => Ok(Reply::Found(value)),
            Response::NotFound => Ok(Reply::NotFound),
            Response::Error(e) => Ok(Reply::Failed(e)),
            _ => Err(KvsError::UnexpectedResponse("get").into()),
        }
    }

    fn delete_key_value(&mut self, name: &str) -> Result<Reply<()>> {
        self.unit_reply(
            Request::Delete {
                name: name.to_string(),
            },
            "delete",
        )
    }

    fn list_key_values(&mut self) -> Result<Vec<KeyValueRecord>> {
        match self.call(&Request::List)? {
            Response::Pairs(pairs) => Ok(pairs),
            Response::Error(e) => Err(KvsError::Remote(e).into()),
            _ => Err(KvsError::UnexpectedResponse("list").into()),
        }
    }

    fn set_key_value_pairs_from_nested_dict(
        &mut self,
        mapping: Map<String, Value>,
    ) -> Result<String> {
        match self.call(&Request::SetNested { mapping })? {
            Response::Summary(summary) => Ok(summary),
            Response::Error(e) => Err(KvsError::Remote(e).into()),
            _ => Err(KvsError::UnexpectedResponse("import").into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::net::{SocketAddr, TcpListener};
    use std::thread::{self, JoinHandle};

    /// Answers a single connection with `response`, yielding the request it read.
    fn reply_once(response: Response) -> (SocketAddrV4, JoinHandle<Request>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = match listener.local_addr().unwrap() {
            SocketAddr::V4(addr) => addr,
            SocketAddr::V6(_) => unreachable!(),
        };
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request: Request = serde_json::from_reader(&stream).unwrap();
            stream
                .write_all(&serde_json::to_vec(&response).unwrap())
                .unwrap();
            request
        });
        (addr, handle)
    }

    #[test]
    fn get_found_value() {
        let (addr, server) = reply_once(Response::Value("bar".to_string()));
        let mut client = TcpClient::new(addr);

        let reply = client.get_key_value("foo").unwrap();

        assert_eq!(reply, Reply::Found("bar".to_string()));
        assert_eq!(
            server.join().unwrap(),
            Request::Get {
                name: "foo".to_string()
            }
        );
    }

    #[test]
    fn not_found_and_remote_errors_are_soft() {
        let (addr, _server) = reply_once(Response::NotFound);
        assert_eq!(
            TcpClient::new(addr).get_key_value("foo").unwrap(),
            Reply::NotFound
        );

        let (addr, _server) = reply_once(Response::Error("denied".to_string()));
        assert_eq!(
            TcpClient::new(addr).delete_key_value("foo").unwrap(),
            Reply::Failed("denied".to_string())
        );
    }

    #[test]
    fn set_sends_one_element_batch() {
        let (addr, server) = reply_once(Response::Done);
        let reply = TcpClient::new(addr)
            .set_key_value_pairs(vec!["k".to_string()], vec!["v".to_string()])
            .unwrap();

        assert_eq!(reply, Reply::Found(()));
        assert_eq!(
            server.join().unwrap(),
            Request::SetPairs {
                names: vec!["k".to_string()],
                values: vec!["v".to_string()],
            }
        );
    }

    #[test]
    fn list_error_is_hard() {
        let (addr, _server) = reply_once(Response::Error("unauthorized".to_string()));
        let err = TcpClient::new(addr).list_key_values().unwrap_err();

        assert!(matches!(
            err.downcast_ref::<KvsError>(),
            Some(KvsError::Remote(_))
        ));
    }

    #[test]
    fn wrong_response_kind_is_rejected() {
        let (addr, _server) = reply_once(Response::Pairs(vec![]));
        let err = TcpClient::new(addr).get_key_value("foo").unwrap_err();

        assert!(matches!(
            err.downcast_ref::<KvsError>(),
            Some(KvsError::UnexpectedResponse("get"))
        ));
    }

    #[test]
    fn nested_mapping_is_sent_unmodified() {
        let (addr, server) = reply_once(Response::Summary("1 pair set".to_string()));
        let mapping = json!({"a": {"b": "c"}}).as_object().unwrap().clone();

        let summary = TcpClient::new(addr)
            .set_key_value_pairs_from_nested_dict(mapping.clone())
            .unwrap();

        assert_eq!(summary, "1 pair set");
        assert_eq!(server.join().unwrap(), Request::SetNested { mapping });
    }

    #[test]
    fn connection_refused_is_hard() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = match listener.local_addr().unwrap() {
            SocketAddr::V4(addr) => addr,
            SocketAddr::V6(_) => unreachable!(),
        };
        drop(listener);

        assert!(TcpClient::new(addr).list_key_values().is_err());
    }
}
