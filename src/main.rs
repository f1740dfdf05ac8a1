use std::path::PathBuf;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    let [image, script, output] = args.as_slice() else {
        anyhow::bail!("usage: snapmark-replay <image> <script.json> <out.png>");
    };
    snapmark::core::replay::run(image, script, output).await
}
