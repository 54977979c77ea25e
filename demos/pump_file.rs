//! File-to-file transcoding example.
//!
//! Rewrites a standard Base64 file into the URL-safe alphabet, then back,
//! using the double-buffered pump over Tokio files.
//!
//! Run with:
//!     cargo run --example pump_file -- <input.b64>

use b64pump::{
    ArrayPool, AsyncReadSource, AsyncWriteSink, CancellationToken, PoolConfig, Pump, PumpConfig,
    Transform, decode_url_safe,
};
use tokio_util::compat::{TokioAsyncReadCompatExt, TokioAsyncWriteCompatExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let input = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "payload.b64".to_string());

    // Generate a demo payload if nothing was given
    if tokio::fs::metadata(&input).await.is_err() {
        use base64::Engine as _;
        let data: Vec<u8> = (0..100_000).map(|i| (i * 31 % 251) as u8).collect();
        let text = base64::engine::general_purpose::STANDARD.encode(&data);
        tokio::fs::write(&input, text).await?;
        println!("Wrote demo payload to {input}");
    }

    let url_safe = format!("{input}.url");
    let restored = format!("{input}.std");

    // A small pool; both pumps below share it.
    let pool = ArrayPool::new(PoolConfig::new(8 * 1024, 64 * 1024, 4)?)?;
    let cancel = CancellationToken::new();

    // Standard -> URL-safe
    let pump = Pump::new(
        pool.clone(),
        PumpConfig::new(8 * 1024)?.with_transform(Transform::ToUrlSafe),
    )?;
    let summary = pump
        .transfer(
            &mut AsyncReadSource::new(tokio::fs::File::open(&input).await?.compat()),
            &mut AsyncWriteSink::new(tokio::fs::File::create(&url_safe).await?.compat_write()),
            &cancel,
        )
        .await?;
    println!(
        "{input} -> {url_safe}: read {} bytes, wrote {} bytes in {} writes",
        summary.bytes_read, summary.bytes_written, summary.writes
    );

    // URL-safe -> standard
    let pump = Pump::new(
        pool.clone(),
        PumpConfig::new(8 * 1024)?.with_transform(Transform::FromUrlSafe),
    )?;
    let summary = pump
        .transfer(
            &mut AsyncReadSource::new(tokio::fs::File::open(&url_safe).await?.compat()),
            &mut AsyncWriteSink::new(tokio::fs::File::create(&restored).await?.compat_write()),
            &cancel,
        )
        .await?;
    println!(
        "{url_safe} -> {restored}: read {} bytes, wrote {} bytes in {} writes",
        summary.bytes_read, summary.bytes_written, summary.writes
    );

    let decoded = decode_url_safe(&tokio::fs::read(&url_safe).await?)?;
    println!("Decoded payload: {} bytes", decoded.len());

    let stats = pool.stats();
    println!(
        "Pool: {} rented, {} returned, {} retained, {} outstanding",
        stats.rented,
        stats.returned,
        stats.retained,
        stats.outstanding()
    );

    Ok(())
}
