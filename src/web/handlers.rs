//! HTTP handlers for the dashboard API endpoints.

use crate::aqi::aqi_from_pm2_5;
use crate::sampling::reading::PARAMETERS;
use crate::state::LatestReading;
use crate::storage::CsvStore;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, Json},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::error;

/// Default trailing window for chart queries, in hours.
const DEFAULT_CHART_HOURS: i64 = 6;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub latest: LatestReading,
    pub store: Arc<CsvStore>,
}

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    pub hours: Option<i64>,
}

/// Get the latest reading and its derived AQI as JSON.
///
/// Falls back to the last row of the data log when no cycle has completed
/// yet in this process, e.g. right after a restart.
pub async fn get_current(State(state): State<AppState>) -> Result<Json<serde_json::Value>, StatusCode> {
    let reading = match state.latest.snapshot().await {
        Some(reading) => Some(reading),
        None => state.store.latest().map_err(|e| {
            error!("failed to read data log: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?,
    };

    let aqi = reading
        .as_ref()
        .and_then(|r| r.pm2_5)
        .map(aqi_from_pm2_5);

    Ok(Json(json!({
        "readings": reading,
        "aqi": aqi,
        "status": "ok",
    })))
}

/// Get the time series for one metric over the trailing N hours.
pub async fn get_chart(
    State(state): State<AppState>,
    Path(parameter): Path<String>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    if !PARAMETERS.contains(&parameter.as_str()) {
        return Err(StatusCode::NOT_FOUND);
    }

    let hours = query.hours.unwrap_or(DEFAULT_CHART_HOURS);
    let series = state.store.series(&parameter, hours).map_err(|e| {
        error!("failed to query series for {}: {}", parameter, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(json!(series)))
}

/// List the metric names available for charting.
pub async fn get_parameters() -> Json<serde_json::Value> {
    Json(json!({ "parameters": PARAMETERS }))
}

/// Health check endpoint.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "airiq",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Serve the main dashboard HTML page from static files.
pub async fn serve_index() -> Result<Html<String>, StatusCode> {
    match tokio::fs::read_to_string("static/index.html").await {
        Ok(content) => Ok(Html(content)),
        Err(e) => {
            error!("Failed to read index.html: {}", e);
            Err(StatusCode::NOT_FOUND)
        }
    }
}

/// Serve a default dashboard HTML page when no static files are available.
pub async fn default_index() -> Html<&'static str> {
    Html(DEFAULT_INDEX_HTML)
}

/// Default HTML content when no static files are provided.
const DEFAULT_INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>AirIQ - Air Quality Monitor</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }

        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, sans-serif;
            background: linear-gradient(135deg, #2b5876 0%, #4e4376 100%);
            color: #333;
            min-height: 100vh;
            padding: 20px;
        }

        .container { max-width: 1000px; margin: 0 auto; }

        .header { text-align: center; margin-bottom: 30px; color: white; }
        .header h1 { font-size: 2.5rem; margin-bottom: 8px; }
        .header p { opacity: 0.9; }

        .aqi-banner {
            text-align: center;
            background: white;
            border-radius: 12px;
            padding: 18px;
            margin-bottom: 24px;
            box-shadow: 0 8px 24px rgba(0,0,0,0.15);
        }
        .aqi-banner .value { font-size: 2.2rem; font-weight: bold; }
        .aqi-banner .category { font-size: 1.1rem; color: #555; }

        .dashboard {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
            gap: 16px;
            margin-bottom: 30px;
        }

        .card {
            background: white;
            border-radius: 12px;
            padding: 18px;
            box-shadow: 0 8px 24px rgba(0,0,0,0.12);
        }

        .card h3 { color: #4e4376; margin-bottom: 8px; font-size: 1rem; }
        .card .reading { font-size: 1.6rem; font-weight: bold; }
        .card .unit { font-size: 0.85rem; color: #888; margin-left: 4px; }

        .status {
            text-align: center;
            color: white;
            padding: 14px;
            background: rgba(255,255,255,0.12);
            border-radius: 10px;
        }

        .error { color: #ff6b6b; }
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>AirIQ</h1>
            <p>DIY Air Quality Monitor</p>
        </div>

        <div class="aqi-banner" id="aqi-banner">
            <div class="value" id="aqi-value">--</div>
            <div class="category" id="aqi-category">Waiting for data</div>
        </div>

        <div class="dashboard" id="dashboard"></div>

        <div class="status" id="status">Connecting to monitor...</div>
    </div>

    <script>
        const PARAMETERS = [
            { key: 'pm1_0', label: 'PM1.0', unit: 'ug/m3' },
            { key: 'pm2_5', label: 'PM2.5', unit: 'ug/m3' },
            { key: 'pm10', label: 'PM10', unit: 'ug/m3' },
            { key: 'co2', label: 'CO2', unit: 'ppm' },
            { key: 'eco2', label: 'eCO2', unit: 'ppm' },
            { key: 'tvoc', label: 'TVOC', unit: 'ppb' },
            { key: 'ozone', label: 'Ozone', unit: 'ppb' },
            { key: 'temperature', label: 'Temperature', unit: '°C' },
            { key: 'humidity', label: 'Humidity', unit: '%' },
        ];

        const dashboard = document.getElementById('dashboard');
        for (const p of PARAMETERS) {
            const card = document.createElement('div');
            card.className = 'card';
            card.innerHTML = `<h3>${p.label}</h3>` +
                `<span class="reading" id="value-${p.key}">--</span>` +
                `<span class="unit">${p.unit}</span>`;
            dashboard.appendChild(card);
        }

        function updateReadings(reading) {
            if (!reading) return;
            for (const p of PARAMETERS) {
                const value = reading[p.key];
                document.getElementById(`value-${p.key}`).textContent =
                    value === null || value === undefined ? '--' : value.toFixed(1);
            }
        }

        function updateAqi(aqi) {
            const banner = document.getElementById('aqi-banner');
            if (!aqi) {
                document.getElementById('aqi-value').textContent = '--';
                document.getElementById('aqi-category').textContent = 'AQI unavailable';
                banner.style.borderTop = 'none';
                return;
            }
            document.getElementById('aqi-value').textContent = aqi.value;
            document.getElementById('aqi-category').textContent = aqi.category;
            banner.style.borderTop = `6px solid ${aqi.color}`;
        }

        let ws;
        let reconnectAttempts = 0;
        const maxReconnectAttempts = 5;

        function connectWebSocket() {
            const protocol = window.location.protocol === 'https:' ? 'wss:' : 'ws:';
            ws = new WebSocket(`${protocol}//${window.location.host}/ws`);

            ws.onopen = function() {
                document.getElementById('status').textContent = 'Connected to monitor';
                reconnectAttempts = 0;
            };

            ws.onmessage = function(event) {
                try {
                    const message = JSON.parse(event.data);
                    if (message.event === 'sensor_data') {
                        updateReadings(message.data);
                        const pm25 = message.data.pm2_5;
                        if (pm25 !== null && pm25 !== undefined) {
                            fetch('/api/current').then(r => r.json()).then(d => updateAqi(d.aqi));
                        }
                    }
                } catch (e) {
                    console.error('Failed to parse WebSocket message:', e);
                }
            };

            ws.onclose = function() {
                document.getElementById('status').textContent = 'Disconnected from monitor';
                document.getElementById('status').classList.add('error');
                if (reconnectAttempts < maxReconnectAttempts) {
                    reconnectAttempts++;
                    setTimeout(connectWebSocket, 2000 * reconnectAttempts);
                }
            };
        }

        connectWebSocket();

        fetch('/api/current')
            .then(response => response.json())
            .then(data => { updateReadings(data.readings); updateAqi(data.aqi); })
            .catch(error => console.error('Failed to fetch initial data:', error));
    </script>
</body>
</html>"#;
