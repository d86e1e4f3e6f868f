use axum::Json;
use nanobot_web_remote::Dashboard;

use crate::{ApiResult, auth::Remote};

pub async fn dashboard(remote: Remote) -> ApiResult<Json<Dashboard>> {
    remote.scoped(|bot| Box::pin(bot.dashboard())).await.map(Json)
}
