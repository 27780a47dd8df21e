use caliper_app::{Args, ArgsError, Command, TerminalView, USAGE};
use caliper_base::{log, log_fatal};
use caliper_camera::CameraDevice;
use caliper_com::{MeasureClient, SelectedFile};
use caliper_ui::{MeasureController, UiError};
use std::path::Path;

#[cfg(feature = "v4l2")]
type Device = caliper_camera::V4l2Device;
#[cfg(not(feature = "v4l2"))]
type Device = caliper_app::NoCamera;

type Controller<D> = MeasureController<D, MeasureClient, TerminalView<std::io::Stdout>>;

#[tokio::main]
async fn main() {
    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(ArgsError::Help) => {
            println!("{USAGE}");
            return;
        }
        Err(e) => {
            eprintln!("{e}\n\n{USAGE}");
            std::process::exit(1);
        }
    };

    if let Err(e) = caliper_base::init_logger(args.log_config()) {
        eprintln!("Cannot open log directory: {e}");
        std::process::exit(1);
    }

    let client = match MeasureClient::new(args.client_config()) {
        Ok(client) => client,
        Err(e) => log_fatal!("Bad server URL: {}", e),
    };
    log::info!("Using backend {}", client.config().base_url());

    let view = TerminalView::stdout(args.out.clone());
    let mut controller = MeasureController::new(Device::default(), client, view)
        .with_camera_config(args.camera_config());
    controller.set_threshold(args.params.threshold);
    controller.set_blur_amount(args.params.blur_amount);
    controller.set_pixel_ratio(args.params.pixel_ratio);

    let result = match &args.command {
        Command::Upload(path) => upload(&mut controller, path).await,
        Command::Camera => capture(&mut controller).await,
    };

    if result.is_err() {
        log::Log::flush(log::logger());
        std::process::exit(1);
    }
}

async fn upload<D: CameraDevice>(controller: &mut Controller<D>, path: &Path) -> Result<(), UiError> {
    let file = match SelectedFile::open(path).await {
        Ok(file) => file,
        Err(e) => log_fatal!("Cannot read {}: {}", path.display(), e),
    };
    controller.select_file(Some(file));
    controller.upload_and_process().await?;
    Ok(())
}

async fn capture<D: CameraDevice>(controller: &mut Controller<D>) -> Result<(), UiError> {
    controller.start_camera().await?;
    controller.capture_frame().await?;
    controller.process_captured().await?;
    Ok(())
}
