use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::http::{StatusCode, header};
use actix_web::web::{self, Data};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, test};
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, RgbImage};
use serde_json::{Value, json};

use erp_admin::auth::Role;
use erp_admin::auth::jwt::{access_claims, issue_token};
use erp_admin::client::UpstreamClient;
use erp_admin::config::Config;
use erp_admin::extraction::PassbookExtractor;
use erp_admin::extraction::ocr::{OcrEngine, OcrError, OcrTimeouts, OcrWorker};
use erp_admin::routes;
use erp_admin::utils::document;
use erp_admin::utils::draft_store::DraftStore;

const SECRET: &str = "integration-secret";
const UNREACHABLE: &str = "http://127.0.0.1:9/api";

/// Recognizer that always reads the same passbook text.
struct FixedText(&'static str);

#[async_trait]
impl OcrEngine for FixedText {
    async fn load(&self) -> Result<Box<dyn OcrWorker>, OcrError> {
        Ok(Box::new(FixedWorker(self.0)))
    }
}

struct FixedWorker(&'static str);

#[async_trait]
impl OcrWorker for FixedWorker {
    async fn recognize(&mut self, _png: &[u8]) -> Result<String, OcrError> {
        Ok(self.0.to_string())
    }

    async fn terminate(&mut self) {}
}

type Recorder = Data<Mutex<Vec<String>>>;

async fn all_profiles() -> HttpResponse {
    HttpResponse::Ok().json(json!([{
        "srNo": 7,
        "employeeSerialNumber": "EMP007",
        "employeeName": "Asha Rao",
        "emailAddress": "asha@example.com",
        "designation": "Analyst",
        "department": "Finance",
        "status": "Y",
        "employmentStatus": "Active",
        "panFile": "data:application/pdf;base64,QUJD"
    }]))
}

async fn save_profile(recorder: Recorder, body: web::Bytes) -> HttpResponse {
    recorder.lock().unwrap().push(String::from_utf8_lossy(&body).into_owned());
    HttpResponse::Ok().json(json!({ "srNo": 8 }))
}

async fn update_profile(recorder: Recorder, body: web::Json<Value>) -> HttpResponse {
    recorder.lock().unwrap().push(body.to_string());
    HttpResponse::Ok().json(body.into_inner())
}

fn holiday_rows() -> Value {
    json!([
        {
            "holidayId": 1,
            "holidayName": "Republic Day",
            "holidayDate": "2025-01-26",
            "holidayType": "National",
            "year": 2025,
            "description": "Constitution of India",
            "mdApprovalStatus": "Y"
        },
        {
            "holidayId": 2,
            "holidayName": "Onam",
            "holidayDate": "2025-09-05",
            "holidayType": "Regional",
            "year": 2025,
            "description": "Harvest festival",
            "mdApprovalStatus": "N"
        }
    ])
}

async fn holidays() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "success": true, "data": holiday_rows() }))
}

async fn add_holiday(recorder: Recorder, req: HttpRequest, body: web::Json<Value>) -> HttpResponse {
    recorder
        .lock()
        .unwrap()
        .push(format!("{}|{}", req.query_string(), body.into_inner()));
    HttpResponse::Ok().json(json!({ "success": true, "message": "Holiday added" }))
}

async fn delete_holiday() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "success": true, "message": "Holiday deleted" }))
}

/// HR backend stand-in; returns its `/api` base URL and the request recorder.
fn spawn_upstream() -> (String, Recorder) {
    let recorder: Recorder = Data::new(Mutex::new(Vec::new()));
    let shared = recorder.clone();
    let server = HttpServer::new(move || {
        App::new().app_data(shared.clone()).service(
            web::scope("/api")
                .route("/user-profiles/all", web::get().to(all_profiles))
                .route("/user-profiles/save", web::post().to(save_profile))
                .route("/user-profiles/update/{sr_no}", web::put().to(update_profile))
                .route("/holidays/all", web::get().to(holidays))
                .route("/holidays/by-year/{year}", web::get().to(holidays))
                .route("/holidays/add", web::post().to(add_holiday))
                .route("/holidays/{id}", web::delete().to(delete_holiday)),
        )
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    (format!("http://{addr}/api"), recorder)
}

fn config(upstream: &str) -> Config {
    let upstream = upstream.to_string();
    Config::from_lookup(move |key| match key {
        "JWT_SECRET" => Some(SECRET.to_string()),
        "UPSTREAM_BASE_URL" => Some(upstream.clone()),
        "PROBE_TIMEOUT_MS" | "REQUEST_TIMEOUT_MS" => Some("2000".to_string()),
        _ => None,
    })
    .unwrap()
}

macro_rules! admin_app {
    ($upstream:expr) => {{
        let config = config($upstream);
        let limiters = routes::Limiters::from_config(&config).unwrap();
        let extractor = PassbookExtractor::new(
            Arc::new(FixedText("Account No: 123456789012\nIFSC: HDFC0001234")),
            OcrTimeouts::default(),
            config.max_upload_bytes,
        );
        test::init_service(
            App::new()
                .app_data(Data::new(config.clone()))
                .app_data(Data::new(UpstreamClient::from_config(&config)))
                .app_data(Data::new(DraftStore::new(100, Duration::from_secs(60))))
                .app_data(Data::new(extractor))
                .configure(|cfg| routes::configure(cfg, config.clone(), limiters.clone())),
        )
        .await
    }};
}

fn token(role: Role) -> String {
    issue_token(&access_claims(1, "hr.admin", role, 3600), SECRET).unwrap()
}

fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

fn as_staff(req: test::TestRequest) -> test::TestRequest {
    req.peer_addr(peer())
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token(Role::Hr))))
}

fn passbook_png() -> String {
    let img = RgbImage::from_pixel(8, 8, image::Rgb([230, 230, 230]));
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    document::encode(&out)
}

#[actix_web::test]
async fn admin_routes_require_a_staff_token() {
    let app = admin_app!(UNREACHABLE);

    let req = test::TestRequest::get().uri("/admin/employees").peer_addr(peer()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/admin/employees")
        .peer_addr(peer())
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token(Role::Employee))))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn employee_grid_reads_the_backend() {
    let (upstream, _) = spawn_upstream();
    let app = admin_app!(&upstream);

    let req = as_staff(test::TestRequest::get().uri("/admin/employees?search=finance"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["offline"], false);
    assert_eq!(body["rows"][0]["status"], "Active");

    let req = as_staff(test::TestRequest::get().uri("/admin/employees/7")).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["approval"], "Approved");
    assert_eq!(body["documents"][0]["slot"], "panFile");
    assert_eq!(body["documents"][0]["preview"]["kind"], "pdf");

    let req = as_staff(test::TestRequest::get().uri("/admin/employees/99")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn unreachable_backend_serves_sample_employees_and_csv() {
    let app = admin_app!(UNREACHABLE);

    let req = as_staff(test::TestRequest::get().uri("/admin/employees")).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["offline"], true);
    assert_eq!(body["total"], 2);
    assert!(body["notice"].as_str().unwrap().ends_with("Displaying fallback data."));

    let req = as_staff(test::TestRequest::get().uri("/admin/employees/export")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("X-Data-Source").unwrap(), "sample");
    assert!(
        resp.headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .contains("user_profiles.csv")
    );
    let csv = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(csv.starts_with("Sr. No.,Employee Serial Number"));
    assert_eq!(csv.lines().count(), 3);
}

#[actix_web::test]
async fn add_employee_draft_end_to_end() {
    let (upstream, recorder) = spawn_upstream();
    let app = admin_app!(&upstream);

    let req = as_staff(test::TestRequest::post().uri("/admin/drafts")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let draft: Value = test::read_body_json(resp).await;
    let id = draft["id"].as_str().unwrap().to_string();
    assert_eq!(draft["mode"]["kind"], "new");

    let req = as_staff(test::TestRequest::patch().uri(&format!("/admin/drafts/{id}")))
        .set_json(json!({ "changes": [
            { "name": "employeeSerialNumber", "value": "EMP010" },
            { "name": "firstName", "value": "Meera" },
            { "name": "surname", "value": "Iyer" },
            { "name": "pan", "value": "abcde1234f" },
            { "name": "adhaar", "value": "234567890123" }
        ]}))
        .to_request();
    let draft: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(draft["form"]["pan"], "ABCDE1234F");
    assert_eq!(draft["issues"].as_array().unwrap().len(), 0);

    let req = as_staff(test::TestRequest::post().uri(&format!("/admin/drafts/{id}/passbook")))
        .set_json(json!({
            "fileName": "passbook.png",
            "contentType": "image/png",
            "data": passbook_png()
        }))
        .to_request();
    let result: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(result["extraction"]["accountNumber"]["value"], "123456789012");
    assert_eq!(result["draft"]["form"]["ifscCode"], "HDFC0001234");
    assert_eq!(result["draft"]["documents"], json!(["passbookFile"]));

    let pan_uri = format!("/admin/drafts/{id}/documents/panFile");
    let req = as_staff(test::TestRequest::put().uri(&pan_uri))
        .set_json(json!({
            "fileName": "pan.pdf",
            "contentType": "application/pdf",
            "data": "QUJD"
        }))
        .to_request();
    let preview: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(preview["kind"], "pdf");
    assert_eq!(preview["sizeBytes"], 3);

    // unconfirmed bank details block the submit
    let req = as_staff(test::TestRequest::post().uri(&format!("/admin/drafts/{id}/submit")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["issues"].as_array().unwrap().len(), 2);

    let req = as_staff(test::TestRequest::patch().uri(&format!("/admin/drafts/{id}")))
        .set_json(json!({ "changes": [
            { "name": "confirmBankAccountNumber", "value": "123456789012" },
            { "name": "confirmIFSCCode", "value": "hdfc0001234" }
        ]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = as_staff(test::TestRequest::post().uri(&format!("/admin/drafts/{id}/submit")))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "Employee added successfully");
    assert_eq!(body["response"]["srNo"], 8);

    let sent = recorder.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("name=\"userProfile\""));
    assert!(sent[0].contains("name=\"passbookFile\""));
    assert!(sent[0].contains("name=\"panFile\""));
    assert!(sent[0].contains("\"employeeName\":\"Meera Iyer\""));
    assert!(sent[0].contains("\"status\":\"N\""));

    let req = as_staff(test::TestRequest::get().uri(&format!("/admin/drafts/{id}"))).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn unknown_fields_reject_the_whole_batch() {
    let app = admin_app!(UNREACHABLE);

    let req = as_staff(test::TestRequest::post().uri("/admin/drafts")).to_request();
    let draft: Value = test::call_and_read_body_json(&app, req).await;
    let id = draft["id"].as_str().unwrap().to_string();

    let req = as_staff(test::TestRequest::patch().uri(&format!("/admin/drafts/{id}")))
        .set_json(json!({ "changes": [
            { "name": "firstName", "value": "Meera" },
            { "name": "salary", "value": "100" }
        ]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = as_staff(test::TestRequest::get().uri(&format!("/admin/drafts/{id}"))).to_request();
    let draft: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(draft["form"]["firstName"], "");
}

#[actix_web::test]
async fn edit_draft_updates_the_stored_profile() {
    let (upstream, recorder) = spawn_upstream();
    let app = admin_app!(&upstream);

    let req = as_staff(test::TestRequest::post().uri("/admin/drafts/profile/7")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let draft: Value = test::read_body_json(resp).await;
    let id = draft["id"].as_str().unwrap().to_string();
    assert_eq!(draft["form"]["employeeName"], "Asha Rao");

    let pan_uri = format!("/admin/drafts/{id}/documents/panFile");
    let req = as_staff(test::TestRequest::get().uri(&pan_uri)).to_request();
    let preview: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(preview["kind"], "pdf");

    let req = as_staff(test::TestRequest::patch().uri(&format!("/admin/drafts/{id}")))
        .set_json(json!({ "changes": [{ "name": "employeeName", "value": "Asha R. Rao" }] }))
        .to_request();
    test::call_service(&app, req).await;

    let req = as_staff(test::TestRequest::post().uri(&format!("/admin/drafts/{id}/submit")))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "Profile updated successfully!");

    let sent: Value = serde_json::from_str(&recorder.lock().unwrap()[0]).unwrap();
    assert_eq!(sent["employeeName"], "Asha R. Rao");
    assert_eq!(sent["panFile"], "data:application/pdf;base64,QUJD");

    let req = as_staff(test::TestRequest::post().uri("/admin/drafts/profile/99")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn holidays_list_add_and_delete() {
    let (upstream, recorder) = spawn_upstream();
    let app = admin_app!(&upstream);

    let req = as_staff(test::TestRequest::get().uri("/admin/holidays?year=2025&type=Regional"))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["offline"], false);
    assert_eq!(page["holidays"].as_array().unwrap().len(), 1);
    assert_eq!(page["holidays"][0]["name"], "Onam");
    assert_eq!(page["counts"], json!({ "total": 2, "approved": 1, "pending": 1, "rejected": 0 }));

    let req = as_staff(test::TestRequest::post().uri("/admin/holidays"))
        .set_json(json!({ "holidays": [
            {
                "holidayName": "Diwali",
                "holidayDate": "2025-10-20",
                "holidayType": "Festival",
                "description": "Festival of lights"
            },
            { "holidayName": "Blank", "holidayDate": "", "description": "" }
        ]}))
        .to_request();
    let outcome: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(outcome["submitted"], 1);
    assert_eq!(outcome["added"], 1);
    assert_eq!(outcome["message"], "Holidays added successfully and sent for MD approval!");

    let sent = recorder.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].starts_with("createdBy=hr.admin|"));
    assert!(sent[0].contains("\"year\":2025"));

    let req = as_staff(test::TestRequest::delete().uri("/admin/holidays/2")).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "Holiday deleted");
}

#[actix_web::test]
async fn holidays_fall_back_when_backend_is_down() {
    let app = admin_app!(UNREACHABLE);

    let req = as_staff(test::TestRequest::get().uri("/admin/holidays?year=2025")).to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["offline"], true);
    assert_eq!(page["counts"]["total"], 4);
    assert_eq!(page["notice"], "Backend server is not available. Showing sample data.");

    let req = as_staff(test::TestRequest::post().uri("/admin/holidays"))
        .set_json(json!({ "holidays": [{
            "holidayName": "Diwali",
            "holidayDate": "2025-10-20",
            "description": "Festival of lights"
        }]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["added"], 0);
}

#[actix_web::test]
async fn passbook_extract_rejects_non_images() {
    let app = admin_app!(UNREACHABLE);

    let req = as_staff(test::TestRequest::post().uri("/admin/passbook/extract"))
        .set_json(json!({ "fileName": "notes.txt", "contentType": "text/plain", "data": "QUJD" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Please select a valid image file");

    let req = as_staff(test::TestRequest::post().uri("/admin/passbook/extract"))
        .set_json(json!({
            "fileName": "pb.png",
            "contentType": "image/png",
            "data": passbook_png()
        }))
        .to_request();
    let outcome: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(outcome["bankName"], "HDFC Bank");
}
