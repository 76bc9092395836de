// Copyright 2024 Karpeles Lab Inc.
// Example of basic LZ4K page compression/decompression

use lz4k::{BlockClass, Decoder, Dict, Encoder, Error};

fn main() {
    let original_data = b"Hello, World! This is a test of LZ4K compression. \
                          LZ4K compresses single memory pages so that a swap \
                          device can keep more of them in RAM. Hello, World!"
        .repeat(20);

    println!("Original data: {} bytes", original_data.len());

    let mut encoder = Encoder::new();
    let decoder = Decoder::new();

    // Page compression
    match encoder.encode_to_vec(&original_data) {
        Ok(compressed) => {
            let class = BlockClass::from_header(compressed[0]);
            println!("Compressed: {} bytes ({:?})", compressed.len(), class);
            println!(
                "  Ratio: {:.2}%\n",
                (compressed.len() as f64 / original_data.len() as f64) * 100.0
            );

            match decoder.decode_to_vec(&compressed) {
                Ok(decompressed) => {
                    println!("Decompression successful!");
                    println!("Decompressed: {} bytes", decompressed.len());

                    if decompressed == original_data {
                        println!("✓ Data matches original!");
                    } else {
                        println!("✗ Data mismatch!");
                    }
                }
                Err(e) => eprintln!("Decompression error: {}", e),
            }
        }
        Err(e) => eprintln!("Compression error: {}", e),
    }

    // A zero page shrinks to a handful of bytes
    println!("\n--- Zero Page ---");
    let zero_page = vec![0u8; 4096];
    if let Ok(compressed) = encoder.encode_to_vec(&zero_page) {
        println!("Original: {} bytes", zero_page.len());
        println!("Compressed: {} bytes", compressed.len());
    }

    // Random data is reported as incompressible, which is not a failure
    println!("\n--- Incompressible Data ---");
    let mut x: u32 = 0x12345678;
    let noise: Vec<u8> = (0..4096)
        .map(|_| {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            x as u8
        })
        .collect();
    match encoder.encode_to_vec(&noise) {
        Ok(compressed) => println!("Compressed: {} bytes", compressed.len()),
        Err(Error::Incompressible) => println!("Page is incompressible, store it as is"),
        Err(e) => eprintln!("Compression error: {}", e),
    }

    // Soft limit: give up once the block would not save enough space
    println!("\n--- Soft Limit ---");
    let mut strict = Encoder::new().with_soft_limit(1024);
    match strict.encode_to_vec(&noise) {
        Ok(compressed) => println!("Compressed under the limit: {} bytes", compressed.len()),
        Err(e) => println!("Gave up early: {}", e),
    }

    // Dictionary compression
    println!("\n--- Dictionary ---");
    let dict_data = b"GET /api/v1/users HTTP/1.1\r\nHost: example.com\r\nAccept: application/json\r\n\r\n"
        .repeat(4);
    if let Some(mut dict) = Dict::new(&dict_data) {
        let request = b"GET /api/v1/users/42 HTTP/1.1\r\nHost: example.com\r\nAccept: application/json\r\n\r\n";
        let mut compressed = vec![0u8; 256];
        match dict.encode(request, &mut compressed) {
            Ok(n) => {
                println!("Request: {} bytes, with dictionary: {} bytes", request.len(), n);
                let mut out = vec![0u8; request.len()];
                if dict.decode(&compressed[..n], &mut out) == Ok(request.len()) && out == request[..] {
                    println!("✓ Dictionary round trip matches!");
                }
            }
            Err(e) => eprintln!("Dictionary compression error: {}", e),
        }
    }
}
