//! Goods-receipt posting handler.
//!
//! ```text
//! POST /api/v1/sap/good-receipts
//! {"credential":"0012345678","delivery_note":"DN-1","doc_date":"31-01-2025",
//!  "post_date":"31-01-2025","items":[{"po_no":"4500000001","line_no":"10",
//!  "qty":5,"plant":"1000"}]}
//! ```

use actix_web::{HttpRequest, HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::domain::ports::{MalformedGoodsReceipt, PostGoodsReceiptRequest, PostedGoodsReceipt};
use crate::domain::{
    ErpOperationFailure, POSTED_MESSAGE, ReceiptLineDraft, ReceiptSubmissionDraft,
    UNHANDLED_FAILURE_MESSAGE,
};
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::schemas::ErpFailureSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::caller_ip;

/// One line of a goods-receipt request body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct ReceiptLineBody {
    #[serde(default)]
    pub po_no: String,
    #[serde(default, alias = "item_po")]
    pub line_no: String,
    /// Number or numeric string.
    #[serde(default)]
    #[schema(value_type = f64)]
    pub qty: Option<Value>,
    #[serde(default)]
    pub plant: String,
    #[serde(default)]
    pub sloc: Option<String>,
    #[serde(default)]
    pub batch_no: Option<String>,
    /// `DD-MM-YYYY`.
    #[serde(default, alias = "dom")]
    pub manufacture_date: Option<String>,
}

/// Goods-receipt request body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct GoodsReceiptBody {
    /// Credential tapped to authorise the posting.
    #[serde(default, alias = "id_card")]
    pub credential: String,
    #[serde(default, alias = "dn_no")]
    pub delivery_note: String,
    /// `DD-MM-YYYY`.
    #[serde(default)]
    pub doc_date: String,
    /// `DD-MM-YYYY`.
    #[serde(default)]
    pub post_date: String,
    #[serde(default)]
    pub items: Vec<ReceiptLineBody>,
}

fn quantity(raw: Option<&Value>) -> Option<f64> {
    match raw? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

impl From<ReceiptLineBody> for ReceiptLineDraft {
    fn from(value: ReceiptLineBody) -> Self {
        Self {
            qty: quantity(value.qty.as_ref()),
            po_no: value.po_no,
            line_no: value.line_no,
            plant: value.plant,
            sloc: value.sloc,
            batch_no: value.batch_no,
            manufacture_date: value.manufacture_date,
        }
    }
}

impl From<GoodsReceiptBody> for ReceiptSubmissionDraft {
    fn from(value: GoodsReceiptBody) -> Self {
        Self {
            credential: value.credential,
            delivery_note: value.delivery_note,
            doc_date: value.doc_date,
            post_date: value.post_date,
            items: value.items.into_iter().map(ReceiptLineDraft::from).collect(),
        }
    }
}

fn posted_meta(posted: &PostedGoodsReceipt) -> Value {
    json!({
        "items_processed": posted.items_processed,
        "logged_in_user": posted.logged_in_user,
        "posted_by_rfid": posted.posted_by_rfid,
        "material_doc_no": posted.material_doc_no,
        "doc_year": posted.doc_year,
    })
}

/// Verify the tapped card, post the receipt to the ERP and record the outcome.
#[utoipa::path(
    post,
    path = "/api/v1/sap/good-receipts",
    request_body = GoodsReceiptBody,
    responses(
        (status = 200, description = "Receipt posted"),
        (status = 400, description = "Session account has no credential", body = ErpFailureSchema),
        (status = 401, description = "Unauthorised", body = ErpFailureSchema),
        (status = 403, description = "Tapped card rejected", body = ErpFailureSchema),
        (status = 422, description = "Validation failed or ERP rejected the receipt", body = ErpFailureSchema),
        (status = 500, description = "ERP or server failure", body = ErpFailureSchema),
        (status = 503, description = "ERP unavailable", body = ErpFailureSchema)
    ),
    tags = ["goods-receipts"],
    operation_id = "postGoodsReceipt"
)]
#[post("/good-receipts")]
pub async fn post_goods_receipt(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    payload: web::Json<Value>,
) -> Result<HttpResponse, ErpOperationFailure> {
    let request_snapshot = payload.into_inner();
    let body: GoodsReceiptBody = match serde_json::from_value(request_snapshot.clone()) {
        Ok(body) => body,
        Err(err) => {
            return Err(state
                .goods_receipts
                .reject_malformed(MalformedGoodsReceipt {
                    caller_ip: caller_ip(&req),
                    error: err.to_string(),
                    request_snapshot,
                })
                .await);
        }
    };
    let session_user = session
        .account_id()
        .map_err(|_| ErpOperationFailure::unhandled(UNHANDLED_FAILURE_MESSAGE))?;

    let posted = state
        .goods_receipts
        .post_goods_receipt(PostGoodsReceiptRequest {
            session_user,
            caller_ip: caller_ip(&req),
            submission: body.into(),
            request_snapshot,
        })
        .await?;

    let meta = posted_meta(&posted);
    Ok(HttpResponse::Ok().json(Envelope::ok(POSTED_MESSAGE, posted.erp_response).with_meta(meta)))
}

#[cfg(test)]
#[path = "good_receipts_tests.rs"]
mod tests;
