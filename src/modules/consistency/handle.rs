use actix_web::{get, post, web};

use crate::api::{error, success};
use crate::modules::consistency::{
    model::{ConsistencyReport, RepairOptions, RepairSummary},
    service::ConsistencyService,
};

#[get("/consistency")]
pub async fn scan(
    consistency_service: web::Data<ConsistencyService>,
) -> Result<success::Success<ConsistencyReport>, error::Error> {
    let report = consistency_service.scan().await?;
    let message = if report.is_clean() { "Images are consistent" } else { "Inconsistencies found" };
    Ok(success::Success::ok(Some(report)).message(message))
}

#[post("/repair")]
pub async fn repair(
    consistency_service: web::Data<ConsistencyService>,
    options: Option<web::Json<RepairOptions>>,
) -> Result<success::Success<RepairSummary>, error::Error> {
    let options = options.map(|o| o.into_inner()).unwrap_or_default();
    let summary = consistency_service.repair(options).await?;
    Ok(success::Success::ok(Some(summary)).message("Repair completed"))
}
