use example_wirecall_rpc_service_definition::{Add, Div, DivArgs, Mult, Say};
use example_wirecall_tcp_app::build_registry;
use std::sync::Arc;
use tokio::join;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use wirecall_rpc_service::RpcCall;
use wirecall_tokio_rpc_client::RpcClient;
use wirecall_tokio_rpc_server::RpcServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // First argument is the bind address; port 0 picks a free one.
    let bind_addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:0".to_string());

    let listener = TcpListener::bind(&bind_addr).await?;
    let addr = listener.local_addr()?;

    let server = Arc::new(RpcServer::with_registry(build_registry()?));
    tracing::info!("Serving {:?}", server.registry().service_names());

    // Spawn the server using the pre-bound listener
    let server_task = tokio::spawn({
        let server = Arc::clone(&server);
        async move {
            server
                .accept_until(listener, async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await
        }
    });

    {
        let rpc_client = RpcClient::connect(addr).await?;

        // `join!` will await all responses before proceeding
        let (res1, res2, res3, res4, res5) = join!(
            Add::call(&rpc_client, "Arith", vec![1.0, 2.0, 3.0]),
            Add::call(&rpc_client, "Arith", vec![8.0, 3.0, 7.0]),
            Mult::call(&rpc_client, "Arith", vec![8.0, 3.0, 7.0]),
            Div::call(
                &rpc_client,
                "Arith",
                DivArgs {
                    dividend: 1.0,
                    divisor: 0.0
                }
            ),
            Say::call(&rpc_client, "Echo", "hello, wirecall".to_string())
        );

        println!("Result from first add(): {:?}", res1);
        println!("Result from second add(): {:?}", res2);
        println!("Result from first mult(): {:?}", res3);
        println!("Result from div() by zero: {:?}", res4);
        println!("Result from say(): {:?}", res5);
    }

    tracing::info!("Listening on {}. Press ctrl-c to stop.", addr);
    server_task.await??;

    Ok(())
}
