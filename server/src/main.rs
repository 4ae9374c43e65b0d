use busline_server::core::CoreApp;

#[tokio::main]
async fn main() {
    if let Err(e) = CoreApp::run().await {
        eprintln!("\n{}\n", CoreApp::error_message(&e));
        std::process::exit(1);
    }
}
