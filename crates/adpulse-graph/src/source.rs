use std::future::Future;

use crate::client::GraphClient;
use crate::error::GraphError;
use crate::insights::InsightsWindow;
use crate::types::{Ad, AdAccount, AdImage, AdSet, Campaign, CustomAudience, InsightsRow};

/// Typed reads against one advertising account.
///
/// [`GraphClient`] is the production implementation; the orchestrator is
/// generic over this trait so batches can run against fakes.
pub trait AccountSource: Send + Sync + 'static {
    fn account(&self) -> impl Future<Output = Result<AdAccount, GraphError>> + Send;

    fn campaigns(&self) -> impl Future<Output = Result<Vec<Campaign>, GraphError>> + Send;

    fn ad_sets(&self) -> impl Future<Output = Result<Vec<AdSet>, GraphError>> + Send;

    fn ads(&self) -> impl Future<Output = Result<Vec<Ad>, GraphError>> + Send;

    fn custom_audiences(
        &self,
    ) -> impl Future<Output = Result<Vec<CustomAudience>, GraphError>> + Send;

    fn ad_images(&self) -> impl Future<Output = Result<Vec<AdImage>, GraphError>> + Send;

    fn insights(
        &self,
        window: InsightsWindow,
    ) -> impl Future<Output = Result<Vec<InsightsRow>, GraphError>> + Send;
}

impl AccountSource for GraphClient {
    fn account(&self) -> impl Future<Output = Result<AdAccount, GraphError>> + Send {
        self.get_account_info()
    }

    fn campaigns(&self) -> impl Future<Output = Result<Vec<Campaign>, GraphError>> + Send {
        self.get_campaigns()
    }

    fn ad_sets(&self) -> impl Future<Output = Result<Vec<AdSet>, GraphError>> + Send {
        self.get_ad_sets()
    }

    fn ads(&self) -> impl Future<Output = Result<Vec<Ad>, GraphError>> + Send {
        self.get_ads()
    }

    fn custom_audiences(
        &self,
    ) -> impl Future<Output = Result<Vec<CustomAudience>, GraphError>> + Send {
        self.get_custom_audiences()
    }

    fn ad_images(&self) -> impl Future<Output = Result<Vec<AdImage>, GraphError>> + Send {
        self.get_ad_images()
    }

    fn insights(
        &self,
        window: InsightsWindow,
    ) -> impl Future<Output = Result<Vec<InsightsRow>, GraphError>> + Send {
        self.get_insights(window)
    }
}
