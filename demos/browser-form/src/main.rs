use s3_post_upload::*;
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), S3Error> {
    dotenvy::dotenv().ok().unwrap();

    // You can create your client from ENV, or manually.
    // `try_from_env` expects:
    // ```
    // S3_BUCKET=
    // S3_REGION=
    // S3_ACCESS_KEY_ID=
    // S3_ACCESS_KEY_SECRET=
    // # optional
    // S3_URL=
    // S3_PARSE_FILE_NAME=true
    // ```
    let client = S3Client::try_from_env().expect("env vars to be set in .env");

    // Pass a path to sign an upload for a real file, otherwise some dummy text is used.
    let file = match std::env::args().nth(1) {
        Some(path) => UploadFile::from_path(path, "application/octet-stream").await?,
        None => UploadFile::new("hello.txt", "text/plain", b"Hello to S3".to_vec()),
    };

    // Only the fields are signed here, nothing is sent to the store.
    // The policy stays valid for 10 minutes, the browser has to POST within that window.
    let form = client.signed_form(file, None, Some("browser"))?;
    let url = &client.config()?.base_url;

    // A browser builds a `FormData` from these fields in exactly this order and appends
    // the file as the last field named `file`.
    let fields = form
        .fields
        .iter()
        .map(|(name, value)| json!({ "name": name, "value": value }))
        .collect::<Vec<_>>();
    let out = json!({
        "url": url,
        "method": "POST",
        "fields": fields,
        "fileField": "file",
    });
    println!("{}", serde_json::to_string_pretty(&out)?);

    println!(
        "\nThe object will be available at {}/{} after the upload",
        url,
        form.key()
    );

    Ok(())
}
