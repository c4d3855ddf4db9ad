//! Load testing for the gateway.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use ledger_gate::config::GateConfig;

mod common;

#[tokio::test]
async fn test_load_performance() {
    // 1. Setup mock replica
    let backend_addr: SocketAddr = "127.0.0.1:28481".parse().unwrap();
    common::start_mock_backend(backend_addr, "Hello from replica").await;

    // 2. Setup gateway config
    let gate_addr: SocketAddr = "127.0.0.1:28482".parse().unwrap();
    let mut config = GateConfig::default();
    config.listener.bind_address = gate_addr.to_string();
    config.upstream.replicas = vec![backend_addr.to_string()];

    // 3. Start gateway
    let shutdown = common::start_gateway(config).await;
    tokio::time::sleep(Duration::from_millis(300)).await;

    // 4. Run load test through the guard with a signed-in session
    let concurrency = 20;
    let requests_per_task = 50;
    let total_requests = concurrency * requests_per_task;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let start = Instant::now();

    let mut tasks = Vec::new();
    for _ in 0..concurrency {
        let client = client.clone();
        let url = format!("http://{}/dashboard", gate_addr);
        tasks.push(tokio::spawn(async move {
            let mut latencies = Vec::new();
            for _ in 0..requests_per_task {
                let req_start = Instant::now();
                match client
                    .get(&url)
                    .header("Cookie", "session=tok; userRole=user")
                    .send()
                    .await
                {
                    Ok(res) => {
                        if res.status().is_success() {
                            latencies.push(req_start.elapsed());
                        }
                    }
                    Err(_) => {}
                }
            }
            latencies
        }));
    }

    let mut all_latencies = Vec::new();
    for task in tasks {
        let latencies = task.await.unwrap();
        all_latencies.extend(latencies);
    }

    let duration = start.elapsed();
    let rps = total_requests as f64 / duration.as_secs_f64();

    if all_latencies.is_empty() {
        panic!("No successful requests recorded");
    }

    all_latencies.sort();
    let p50 = all_latencies[all_latencies.len() / 2];
    let p95 = all_latencies[(all_latencies.len() as f64 * 0.95) as usize];
    let p99 = all_latencies[(all_latencies.len() as f64 * 0.99) as usize];

    println!("\n--- Load Test Results ---");
    println!("Total Requests: {}", total_requests);
    println!("Concurrency:    {}", concurrency);
    println!("Total Duration: {:?}", duration);
    println!("Requests/sec:   {:.2}", rps);
    println!("P50 Latency:    {:?}", p50);
    println!("P95 Latency:    {:?}", p95);
    println!("P99 Latency:    {:?}", p99);
    println!("Success Rate:   {}/{}", all_latencies.len(), total_requests);
    println!("-------------------------\n");

    shutdown.trigger();
}
