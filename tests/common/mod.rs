//! In-process fake server speaking the QuorumKV wire protocol
//!
//! Wire-faithful enough for contract tests: prologue + hello handshake,
//! tagged commands, result-code responses, and all-or-nothing sequence
//! application over an in-memory map.

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter, Cursor, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use quorumkv::protocol::codec;
use quorumkv::protocol::command::COMMAND_MASK;
use quorumkv::Config;

type Store = BTreeMap<String, String>;

/// Error reply: (result code, message)
type Reply = std::result::Result<Vec<u8>, (u32, String)>;

pub struct FakeServer {
    addr: String,
    cluster_id: String,
    data: Arc<Mutex<Store>>,
}

impl FakeServer {
    /// Bind to an ephemeral port and start accepting connections
    pub fn start(cluster_id: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake server");
        let addr = listener.local_addr().expect("local addr").to_string();
        let data: Arc<Mutex<Store>> = Arc::new(Mutex::new(BTreeMap::new()));

        let cluster = cluster_id.to_string();
        let conn_data = Arc::clone(&data);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let cluster = cluster.clone();
                let data = Arc::clone(&conn_data);
                thread::spawn(move || {
                    let _ = handle_connection(stream, &cluster, &data);
                });
            }
        });

        Self {
            addr,
            cluster_id: cluster_id.to_string(),
            data,
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// A client config pointing at this server
    pub fn config(&self) -> Config {
        Config::builder()
            .cluster_id(self.cluster_id.as_str())
            .client_id("test-client")
            .node(self.addr.as_str())
            .build()
    }

    /// Seed a key directly, bypassing the protocol
    #[allow(dead_code)]
    pub fn insert(&self, key: &str, value: &str) {
        self.data.lock().insert(key.to_string(), value.to_string());
    }

    /// Copy of the current store contents
    #[allow(dead_code)]
    pub fn snapshot(&self) -> Store {
        self.data.lock().clone()
    }
}

fn handle_connection(
    stream: TcpStream,
    cluster_id: &str,
    data: &Arc<Mutex<Store>>,
) -> quorumkv::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = BufWriter::new(stream);

    // Prologue: magic, version, cluster id. No response; a cluster
    // mismatch is reported on every subsequent command.
    let magic = codec::read_u32(&mut reader)?;
    let _version = codec::read_u32(&mut reader)?;
    let prologue_cluster = codec::read_string(&mut reader)?;
    let wrong_cluster = magic != COMMAND_MASK || prologue_cluster != cluster_id;

    loop {
        let tag = match codec::read_u32(&mut reader) {
            Ok(tag) => tag,
            // Client went away
            Err(_) => return Ok(()),
        };

        let reply = if tag & COMMAND_MASK != COMMAND_MASK {
            Err((0x01, "no magic in command tag".to_string()))
        } else if wrong_cluster {
            // Still consume the arguments so the stream stays aligned
            let _ = dispatch(tag & !COMMAND_MASK, &mut reader, data);
            Err((0x06, format!("this is not cluster {prologue_cluster}")))
        } else {
            dispatch(tag & !COMMAND_MASK, &mut reader, data)
        };

        let mut frame = Vec::new();
        match reply {
            Ok(body) => {
                codec::write_u32(&mut frame, 0x00);
                frame.extend_from_slice(&body);
            }
            Err((code, message)) => {
                codec::write_u32(&mut frame, code);
                codec::write_string(&mut frame, &message);
            }
        }
        writer.write_all(&frame)?;
        writer.flush()?;
    }
}

/// Decode one command's arguments and produce its response body
fn dispatch<R: Read>(code: u32, reader: &mut R, data: &Arc<Mutex<Store>>) -> Reply {
    let mut body = Vec::new();
    match code {
        // Hello
        0x01 => {
            let _client_id = read(reader)?;
            let _cluster_id = read(reader)?;
            codec::write_string(&mut body, "quorumkv-fake/0.1.0");
        }

        // WhoMaster
        0x02 => {
            codec::write_option_string(&mut body, Some("fake-master"));
        }

        // Exists
        0x07 => {
            let _consistency = read_consistency(reader)?;
            let key = read(reader)?;
            codec::write_bool(&mut body, data.lock().contains_key(&key));
        }

        // Get
        0x08 => {
            let _consistency = read_consistency(reader)?;
            let key = read(reader)?;
            match data.lock().get(&key) {
                Some(value) => codec::write_string(&mut body, value),
                None => return Err((0x05, key)),
            }
        }

        // Set
        0x09 => {
            let key = read(reader)?;
            let value = read(reader)?;
            data.lock().insert(key, value);
        }

        // Delete
        0x0a => {
            let key = read(reader)?;
            if data.lock().remove(&key).is_none() {
                return Err((0x05, key));
            }
        }

        // Range
        0x0b => {
            let _consistency = read_consistency(reader)?;
            let (begin, begin_incl, end, end_incl, max) = read_range_args(reader)?;
            let keys = range_keys(&data.lock(), &begin, begin_incl, &end, end_incl, max);
            codec::write_list(&mut body, &keys, |b, k| codec::write_string(b, k));
        }

        // PrefixKeys
        0x0c => {
            let _consistency = read_consistency(reader)?;
            let prefix = read(reader)?;
            let max = codec::read_i32(reader).map_err(internal)?;
            let store = data.lock();
            let mut keys: Vec<String> = store
                .keys()
                .filter(|k| k.starts_with(&prefix))
                .cloned()
                .collect();
            if max >= 0 {
                keys.truncate(max as usize);
            }
            codec::write_list(&mut body, &keys, |b, k| codec::write_string(b, k));
        }

        // TestAndSet
        0x0d => {
            let key = read(reader)?;
            let expected = read_opt(reader)?;
            let replacement = read_opt(reader)?;
            let mut store = data.lock();
            let previous = store.get(&key).cloned();
            if previous == expected {
                match replacement {
                    Some(value) => {
                        store.insert(key, value);
                    }
                    None => {
                        store.remove(&key);
                    }
                }
            }
            codec::write_option_string(&mut body, previous.as_deref());
        }

        // RangeEntries
        0x0f => {
            let _consistency = read_consistency(reader)?;
            let (begin, begin_incl, end, end_incl, max) = read_range_args(reader)?;
            let store = data.lock();
            let keys = range_keys(&store, &begin, begin_incl, &end, end_incl, max);
            let entries: Vec<(String, String)> = keys
                .into_iter()
                .filter_map(|k| store.get(&k).cloned().map(|v| (k, v)))
                .collect();
            codec::write_list(&mut body, &entries, |b, (k, v)| {
                codec::write_string(b, k);
                codec::write_string(b, v);
            });
        }

        // Sequence / SyncedSequence: all-or-nothing over a staging copy
        0x10 | 0x24 => {
            let blob = codec::read_blob(reader).map_err(internal)?;
            let mut cursor = Cursor::new(blob);
            let mut staged = data.lock().clone();
            apply_update(&mut cursor, &mut staged)?;
            *data.lock() = staged;
        }

        // MultiGet
        0x11 => {
            let _consistency = read_consistency(reader)?;
            let keys = codec::read_string_list(reader).map_err(internal)?;
            let store = data.lock();
            let mut values = Vec::with_capacity(keys.len());
            for key in keys {
                match store.get(&key) {
                    Some(value) => values.push(value.clone()),
                    None => return Err((0x05, key)),
                }
            }
            codec::write_list(&mut body, &values, |b, v| codec::write_string(b, v));
        }

        // Statistics
        0x13 => {
            codec::write_blob(&mut body, b"fake-statistics");
        }

        // CollapseTlogs
        0x14 => {
            let _count = codec::read_i32(reader).map_err(internal)?;
        }

        // OptimizeDb / DefragDb / DropMaster / Nop
        0x25 | 0x26 | 0x30 | 0x41 => {}

        // DeletePrefix
        0x27 => {
            let prefix = read(reader)?;
            let mut store = data.lock();
            let doomed: Vec<String> = store
                .keys()
                .filter(|k| k.starts_with(&prefix))
                .cloned()
                .collect();
            for key in &doomed {
                store.remove(key);
            }
            codec::write_i32(&mut body, doomed.len() as i32);
        }

        // Version
        0x28 => {
            codec::write_i32(&mut body, 0);
            codec::write_i32(&mut body, 1);
            codec::write_i32(&mut body, 0);
            codec::write_string(&mut body, "quorumkv-fake");
        }

        // MultiGetOption
        0x31 => {
            let _consistency = read_consistency(reader)?;
            let keys = codec::read_string_list(reader).map_err(internal)?;
            let store = data.lock();
            let values: Vec<Option<String>> =
                keys.iter().map(|k| store.get(k).cloned()).collect();
            codec::write_list(&mut body, &values, |b, v| {
                codec::write_option_string(b, v.as_deref())
            });
        }

        other => return Err((0x20, format!("unsupported command 0x{other:02x}"))),
    }
    Ok(body)
}

/// Apply one sequence update (tag already pending in the cursor) to the
/// staging store; any failure aborts the whole batch
fn apply_update(cursor: &mut Cursor<Vec<u8>>, staged: &mut Store) -> std::result::Result<(), (u32, String)> {
    let tag = codec::read_u32(cursor).map_err(internal)?;
    match tag {
        // Set
        1 => {
            let key = read(cursor)?;
            let value = read(cursor)?;
            staged.insert(key, value);
        }
        // Delete
        2 => {
            let key = read(cursor)?;
            if staged.remove(&key).is_none() {
                return Err((0x05, key));
            }
        }
        // TestAndSet
        3 => {
            let key = read(cursor)?;
            let expected = read_opt(cursor)?;
            let replacement = read_opt(cursor)?;
            if staged.get(&key).cloned() == expected {
                match replacement {
                    Some(value) => {
                        staged.insert(key, value);
                    }
                    None => {
                        staged.remove(&key);
                    }
                }
            }
        }
        // Nested sequence
        5 => {
            let count = codec::read_u32(cursor).map_err(internal)?;
            for _ in 0..count {
                apply_update(cursor, staged)?;
            }
        }
        // Assert
        8 => {
            let key = read(cursor)?;
            let expected = read_opt(cursor)?;
            if staged.get(&key).cloned() != expected {
                return Err((0x07, format!("assertion failed for {key}")));
            }
        }
        // DeletePrefix
        14 => {
            let prefix = read(cursor)?;
            let doomed: Vec<String> = staged
                .keys()
                .filter(|k| k.starts_with(&prefix))
                .cloned()
                .collect();
            for key in &doomed {
                staged.remove(key);
            }
        }
        // AssertExists
        15 => {
            let key = read(cursor)?;
            if !staged.contains_key(&key) {
                return Err((0x07, format!("assertion failed for {key}")));
            }
        }
        other => return Err((0x26, format!("unknown update tag {other}"))),
    }
    Ok(())
}

fn read<R: Read>(reader: &mut R) -> std::result::Result<String, (u32, String)> {
    codec::read_string(reader).map_err(internal)
}

fn read_opt<R: Read>(reader: &mut R) -> std::result::Result<Option<String>, (u32, String)> {
    codec::read_option_string(reader).map_err(internal)
}

fn read_consistency<R: Read>(
    reader: &mut R,
) -> std::result::Result<quorumkv::Consistency, (u32, String)> {
    quorumkv::Consistency::decode(reader).map_err(internal)
}

type RangeArgs = (Option<String>, bool, Option<String>, bool, i32);

fn read_range_args<R: Read>(reader: &mut R) -> std::result::Result<RangeArgs, (u32, String)> {
    let begin = read_opt(reader)?;
    let begin_incl = codec::read_bool(reader).map_err(internal)?;
    let end = read_opt(reader)?;
    let end_incl = codec::read_bool(reader).map_err(internal)?;
    let max = codec::read_i32(reader).map_err(internal)?;
    Ok((begin, begin_incl, end, end_incl, max))
}

fn range_keys(
    store: &Store,
    begin: &Option<String>,
    begin_incl: bool,
    end: &Option<String>,
    end_incl: bool,
    max: i32,
) -> Vec<String> {
    let mut keys: Vec<String> = store
        .keys()
        .filter(|k| match begin {
            Some(b) if begin_incl => k.as_str() >= b.as_str(),
            Some(b) => k.as_str() > b.as_str(),
            None => true,
        })
        .filter(|k| match end {
            Some(e) if end_incl => k.as_str() <= e.as_str(),
            Some(e) => k.as_str() < e.as_str(),
            None => true,
        })
        .cloned()
        .collect();
    if max >= 0 {
        keys.truncate(max as usize);
    }
    keys
}

fn internal(e: quorumkv::ClientError) -> (u32, String) {
    (0x26, e.to_string())
}
