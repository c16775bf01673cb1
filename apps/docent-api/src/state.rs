use std::sync::Arc;

use docent_service::DocentService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<DocentService>,
}
impl AppState {
	pub async fn new(config: docent_config::Config) -> color_eyre::Result<Self> {
		let service = DocentService::open(config).await?;

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: DocentService) -> Self {
		Self { service: Arc::new(service) }
	}
}
