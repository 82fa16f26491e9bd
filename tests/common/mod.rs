use std::fs::File;
use std::io::Error;
use std::path::Path;

/// Destination route carrying `id` the way the receive endpoint tags it.
pub fn destination(id: &str) -> String {
    format!("test.receiver.{}.token.secret", id)
}

pub fn generate_chunk_csv(path: &Path, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["destination", "amount"])?;

    for _ in 0..rows {
        wtr.write_record([destination("abc").as_str(), "1.0"])?;
    }

    wtr.flush()?;
    Ok(())
}
