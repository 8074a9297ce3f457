#![no_main]

use std::sync::{Arc, OnceLock};

use evm_event_enricher::{
	models::{AssetCollection, EVMTransactionBundle},
	repositories::AssetRepository,
	services::enrichment::EnrichmentPipeline,
};
use libfuzzer_sys::fuzz_target;

const ASSETS: &str = include_str!("../../config/assets/ethereum.json");

fn pipeline() -> &'static EnrichmentPipeline {
	static PIPELINE: OnceLock<EnrichmentPipeline> = OnceLock::new();
	PIPELINE.get_or_init(|| {
		let collection: AssetCollection =
			serde_json::from_str(ASSETS).expect("bundled asset config is valid");
		let chain_id = collection.chain_id;
		let assets = AssetRepository::from_collections([collection])
			.expect("bundled asset config is consistent");
		EnrichmentPipeline::with_default_decoders(chain_id, Arc::new(assets))
			.expect("default decoders register")
	})
}

fuzz_target!(|data: &[u8]| {
	let Ok(bundle) = serde_json::from_slice::<EVMTransactionBundle>(data) else {
		return;
	};
	let events = bundle.events.len();

	if let Ok(decoded) = pipeline().decode_transaction(bundle) {
		assert_eq!(decoded.events.len(), events);
	}
});
