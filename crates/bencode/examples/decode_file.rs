//! Simple decoder to inspect bencode files.

use std::fs;

use bencode::hash::to_hex;
use bencode::{content_hash, decode_slice, Value};

const MAX_ITEMS: usize = 20;

fn format_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => {
            let preview: String = text.chars().take(80).collect();
            if text.len() > 80 {
                format!("\"{}...\"", preview)
            } else {
                format!("\"{}\"", preview)
            }
        }
        Err(_) => format!("BYTES[{}]", bytes.len()),
    }
}

fn print_value(value: &Value, indent: usize) {
    let pad = "  ".repeat(indent);
    match value {
        Value::Integer(n) => println!("{}{}", pad, n),
        Value::ByteString(bytes) => println!("{}{}", pad, format_bytes(bytes)),
        Value::List(items) => {
            println!("{}list ({})", pad, items.len());
            for item in items.iter().take(MAX_ITEMS) {
                print_value(item, indent + 1);
            }
            if items.len() > MAX_ITEMS {
                println!("{}  ... and {} more items", pad, items.len() - MAX_ITEMS);
            }
        }
        Value::Dictionary(dict) => {
            println!("{}dict ({})", pad, dict.len());
            for (key, item) in dict.iter().take(MAX_ITEMS) {
                match item {
                    Value::Integer(n) => println!("{}  {} = {}", pad, format_bytes(key), n),
                    Value::ByteString(bytes) => {
                        println!("{}  {} = {}", pad, format_bytes(key), format_bytes(bytes))
                    }
                    Value::List(_) | Value::Dictionary(_) => {
                        println!("{}  {}:", pad, format_bytes(key));
                        print_value(item, indent + 2);
                    }
                }
            }
            if dict.len() > MAX_ITEMS {
                println!("{}  ... and {} more entries", pad, dict.len() - MAX_ITEMS);
            }
        }
    }
}

fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "example.torrent".to_string());

    println!("Reading: {}", path);

    let data = fs::read(&path).expect("Failed to read file");
    println!("File size: {} bytes", data.len());

    let value = decode_slice(&data).expect("Failed to decode");

    println!("\n=== Content ===");
    print_value(&value, 0);

    println!("\n=== Hashes ===");
    let hash = content_hash(&value).expect("Failed to hash");
    println!("Content (canonical): {}", to_hex(&hash));
    if let Some(info) = value.get("info") {
        let info_hash = bencode::hash::digest_with_options(info, bencode::EncodeOptions::new())
            .expect("Failed to hash info");
        println!("Info dictionary:     {}", to_hex(&info_hash));
    }
}
