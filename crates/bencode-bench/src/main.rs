//! Benchmark for bencode serialization using torrent metainfo records.
//!
//! Loads a JSON dataset of torrents (or synthesizes one when no file is
//! given), converts it to bencode records and times encode, decode and bind.

use std::fs;
use std::path::Path;
use std::time::Instant;

use bencode::{ByteBuf, EncodeOptions, Value};
use serde::Deserialize;

const ITERS: u32 = 10;
const SYNTHETIC_TORRENTS: u32 = 20_000;
const PIECE_HASH_LEN: usize = 20;

// =============================================================================
// JSON DATA STRUCTURES
// =============================================================================

#[derive(Debug, Deserialize)]
struct JsonTorrent {
    announce: String,
    #[serde(rename = "announce-list", default)]
    announce_list: Vec<Vec<String>>,
    #[serde(default)]
    comment: Option<String>,
    #[serde(rename = "creation date", default)]
    creation_date: Option<i64>,
    name: String,
    #[serde(rename = "piece length")]
    piece_length: i64,
    pieces: usize,
    files: Vec<JsonFile>,
}

#[derive(Debug, Deserialize)]
struct JsonFile {
    length: i64,
    path: Vec<String>,
}

// =============================================================================
// BENCODE RECORDS
// =============================================================================

bencode::record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct FileEntry {
        #[tag = "length"]
        pub length: i64,
        #[tag = "path"]
        pub path: Vec<String>,
    }
}

bencode::record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Info {
        #[tag = "files"]
        pub files: Vec<FileEntry>,
        #[tag = "name"]
        pub name: String,
        #[tag = "piece length"]
        pub piece_length: i64,
        #[tag = "pieces"]
        pub pieces: ByteBuf,
    }
}

bencode::record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Metainfo {
        #[tag = "announce"]
        pub announce: String,
        #[tag = "announce-list,omitempty"]
        pub announce_list: Vec<Vec<String>>,
        #[tag = "comment,omitempty"]
        pub comment: String,
        #[tag = "creation date,omitempty"]
        pub creation_date: i64,
        #[tag = "info"]
        pub info: Info,
    }
}

// =============================================================================
// CONVERSION
// =============================================================================

/// Deterministic filler for piece hashes.
fn piece_bytes(seed: u64, pieces: usize) -> ByteBuf {
    let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
    let mut out = Vec::with_capacity(pieces * PIECE_HASH_LEN);
    for _ in 0..pieces * PIECE_HASH_LEN {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        out.push(state as u8);
    }
    ByteBuf(out)
}

fn convert(torrent: &JsonTorrent, seed: u64) -> Metainfo {
    Metainfo {
        announce: torrent.announce.clone(),
        announce_list: torrent.announce_list.clone(),
        comment: torrent.comment.clone().unwrap_or_default(),
        creation_date: torrent.creation_date.unwrap_or_default(),
        info: Info {
            files: torrent
                .files
                .iter()
                .map(|f| FileEntry {
                    length: f.length,
                    path: f.path.clone(),
                })
                .collect(),
            name: torrent.name.clone(),
            piece_length: torrent.piece_length,
            pieces: piece_bytes(seed, torrent.pieces),
        },
    }
}

fn synthesize(count: u32) -> Vec<JsonTorrent> {
    (0..count)
        .map(|i| JsonTorrent {
            announce: format!("http://tracker{}.example.org/announce", i % 7),
            announce_list: vec![
                vec![format!("http://tracker{}.example.org/announce", i % 7)],
                vec!["udp://backup.example.org:6969".to_string()],
            ],
            comment: (i % 3 == 0).then(|| format!("release {i}")),
            creation_date: Some(1_704_067_200 + i64::from(i)),
            name: format!("dataset-{i:05}"),
            piece_length: 262_144,
            pieces: 4 + (i as usize % 12),
            files: (0..1 + i % 4)
                .map(|j| JsonFile {
                    length: 1_000_000 + i64::from(i * 31 + j),
                    path: vec!["data".to_string(), format!("part-{j}.bin")],
                })
                .collect(),
        })
        .collect()
}

fn mb(bytes: usize) -> f64 {
    bytes as f64 / 1_000_000.0
}

fn main() {
    let data_path = std::env::args().nth(1);

    let torrents = match &data_path {
        Some(path) => {
            println!("Loading torrents from: {}", path);
            let json_data = fs::read_to_string(path).expect("Failed to read dataset");
            let parse_start = Instant::now();
            let torrents: Vec<JsonTorrent> =
                serde_json::from_str(&json_data).expect("Failed to parse JSON");
            println!("Loaded {} torrents in {:?}", torrents.len(), parse_start.elapsed());
            torrents
        }
        None => {
            println!("No dataset given, synthesizing {} torrents", SYNTHETIC_TORRENTS);
            synthesize(SYNTHETIC_TORRENTS)
        }
    };

    let convert_start = Instant::now();
    let records: Vec<Metainfo> = torrents
        .iter()
        .enumerate()
        .map(|(i, t)| convert(t, i as u64))
        .collect();
    println!("Converted to records in {:?}", convert_start.elapsed());

    // Encode records (declaration order)
    let encode_start = Instant::now();
    let mut encoded = Vec::new();
    for _ in 0..ITERS {
        encoded.clear();
        for record in &records {
            encoded.push(bencode::to_bytes(record).expect("Failed to encode"));
        }
    }
    let encode_time = encode_start.elapsed() / ITERS;
    let total_bytes: usize = encoded.iter().map(Vec::len).sum();

    println!("\nEncode: {:?} (avg of {} iterations)", encode_time, ITERS);
    println!("  Throughput: {:.2} MB/s", mb(total_bytes) / encode_time.as_secs_f64());

    // Decode to value trees
    let decode_start = Instant::now();
    let mut trees: Vec<Value> = Vec::new();
    for _ in 0..ITERS {
        trees = encoded
            .iter()
            .map(|bytes| bencode::decode_slice(bytes).expect("Failed to decode"))
            .collect();
    }
    let decode_time = decode_start.elapsed() / ITERS;

    println!("\nDecode: {:?} (avg of {} iterations)", decode_time, ITERS);
    println!("  Throughput: {:.2} MB/s", mb(total_bytes) / decode_time.as_secs_f64());

    // Bind value trees back to records
    let bind_start = Instant::now();
    for _ in 0..ITERS {
        for (tree, record) in trees.iter().zip(&records) {
            let bound: Metainfo = bencode::from_value(tree.clone()).expect("Failed to bind");
            assert_eq!(&bound, record);
        }
    }
    let bind_time = bind_start.elapsed() / ITERS;
    println!("\nBind: {:?} (avg of {} iterations)", bind_time, ITERS);

    // Canonical re-encoding and content hashes
    let canonical_start = Instant::now();
    let mut canonical_bytes = 0;
    for tree in &trees {
        canonical_bytes += bencode::to_vec_with_options(tree, EncodeOptions::canonical())
            .expect("Failed to encode canonically")
            .len();
    }
    println!("\nCanonical encode: {:?}", canonical_start.elapsed());
    assert_eq!(canonical_bytes, total_bytes);

    let hash_start = Instant::now();
    for tree in &trees {
        bencode::content_hash(tree).expect("Failed to hash");
    }
    println!("Content hash: {:?}", hash_start.elapsed());

    if let Some(path) = &data_path {
        let input_path = Path::new(path);
        let stem = input_path.file_stem().unwrap_or_default().to_string_lossy();
        let parent = input_path.parent().unwrap_or(Path::new("."));
        let output = parent.join(format!("{}.torrents.bencode", stem));
        let mut out = Vec::with_capacity(total_bytes + 2);
        bencode::encode_record(&records, &mut out).expect("Failed to encode dataset");
        fs::write(&output, &out).expect("Failed to write output file");
        println!("\n=== Output File ===");
        println!("{}", output.display());
    }

    println!("\n=== Summary ===");
    println!("Torrents: {}", records.len());
    println!("Bencode: {} bytes ({:.1} MB)", total_bytes, mb(total_bytes));
    println!("Average record: {} bytes", total_bytes / records.len().max(1));
}
