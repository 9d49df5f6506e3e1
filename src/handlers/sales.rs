// src/handlers/sales.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        reports::{DateRange, SalesCountsResponse},
        sales::SalesChannel,
    },
};

// ---
// Query: ?days=30  ou  ?startDate=...&endDate=...
// ---
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CountsQuery {
    /// Janela em dias até agora. Ignorado se alguma data for informada.
    #[validate(range(min = 1, max = 3650, message = "O campo 'days' deve estar entre 1 e 3650."))]
    pub days: Option<i64>,

    /// RFC 3339 ou YYYY-MM-DD
    pub start_date: Option<String>,

    /// RFC 3339 ou YYYY-MM-DD (só a data cobre o dia inteiro)
    pub end_date: Option<String>,
}

impl CountsQuery {
    /// Intervalo pedido. `None` = sem filtro de data.
    pub fn resolve_range(&self, now: DateTime<Utc>) -> Result<Option<DateRange>, AppError> {
        if self.start_date.is_none() && self.end_date.is_none() {
            return Ok(self.days.map(|days| DateRange {
                start: Some(now - TimeDelta::seconds(days * 86_400)),
                end: Some(now),
            }));
        }

        let start = self
            .start_date
            .as_deref()
            .map(|text| parse_bound(text, "startDate", false))
            .transpose()?;
        let end = self
            .end_date
            .as_deref()
            .map(|text| parse_bound(text, "endDate", true))
            .transpose()?;

        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(AppError::BadRequest(
                    "'startDate' não pode ser posterior a 'endDate'.".to_string(),
                ));
            }
        }

        Ok(Some(DateRange { start, end }))
    }
}

fn parse_bound(text: &str, name: &str, end_of_day: bool) -> Result<DateTime<Utc>, AppError> {
    let text = text.trim();

    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Ok(at.with_timezone(&Utc));
    }

    let day = NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| {
        AppError::BadRequest(format!("'{name}' deve ser uma data ISO (YYYY-MM-DD ou RFC 3339)."))
    })?;

    let naive = if end_of_day {
        day.and_hms_milli_opt(23, 59, 59, 999)
    } else {
        day.and_hms_opt(0, 0, 0)
    };
    naive
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AppError::BadRequest(format!("'{name}' fora do intervalo suportado.")))
}

// GET /api/sales/{channel}/counts
#[utoipa::path(
    get,
    path = "/api/sales/{channel}/counts",
    tag = "Sales",
    params(
        ("channel" = SalesChannel, Path, description = "Canal de venda"),
        CountsQuery
    ),
    responses(
        (status = 200, description = "Contagens e total do canal", body = SalesCountsResponse),
        (status = 400, description = "Parâmetros inválidos"),
        (status = 401, description = "Não autorizado"),
        (status = 500, description = "Falha no banco de dados")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_counts(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    WithRejection(Path(channel), _): WithRejection<Path<SalesChannel>, AppError>,
    WithRejection(Query(query), _): WithRejection<Query<CountsQuery>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    query.validate()?;
    let range = query.resolve_range(Utc::now())?;

    tracing::debug!(user = %user.0.sub, %channel, ?range, "consulta de contagens");

    let report = app_state
        .sales_service
        .get_counts(&app_state.sales_store, channel, range.as_ref())
        .await?;

    Ok((StatusCode::OK, Json(SalesCountsResponse::from(report))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    #[test]
    fn no_parameters_means_no_filter() {
        assert_eq!(CountsQuery::default().resolve_range(now()).unwrap(), None);
    }

    #[test]
    fn days_counts_back_from_now() {
        let query = CountsQuery { days: Some(7), ..Default::default() };
        let range = query.resolve_range(now()).unwrap().unwrap();
        assert_eq!(range.start, Some(Utc.with_ymd_and_hms(2024, 6, 23, 12, 0, 0).unwrap()));
        assert_eq!(range.end, Some(now()));
    }

    #[test]
    fn explicit_dates_take_precedence_over_days() {
        let query = CountsQuery {
            days: Some(7),
            start_date: Some("2024-01-01".into()),
            end_date: Some("2024-01-31".into()),
        };
        let range = query.resolve_range(now()).unwrap().unwrap();
        assert_eq!(range.start, Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
        assert!(range.contains(Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap()));
        assert!(!range.contains(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn open_ended_range_is_allowed() {
        let query = CountsQuery { start_date: Some("2024-03-01T10:00:00Z".into()), ..Default::default() };
        let range = query.resolve_range(now()).unwrap().unwrap();
        assert_eq!(range.end, None);
    }

    #[test]
    fn bad_or_inverted_dates_are_rejected() {
        let bad = CountsQuery { start_date: Some("ontem".into()), ..Default::default() };
        assert!(matches!(bad.resolve_range(now()), Err(AppError::BadRequest(_))));

        let inverted = CountsQuery {
            start_date: Some("2024-02-01".into()),
            end_date: Some("2024-01-01".into()),
            ..Default::default()
        };
        assert!(matches!(inverted.resolve_range(now()), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn days_out_of_range_fail_validation() {
        assert!(CountsQuery { days: Some(0), ..Default::default() }.validate().is_err());
        assert!(CountsQuery { days: Some(30), ..Default::default() }.validate().is_ok());
    }
}
