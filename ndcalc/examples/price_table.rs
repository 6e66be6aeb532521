use ndcalc::{
    Annotation, CalcMode, Coordinate, DenseMatrix, Dimension, MatrixHandle, Value, ROW,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn main() -> ndcalc::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("Price table - NEW / LINK / ORIG");

    let prices = MatrixHandle::new(DenseMatrix::from_rows(vec![
        vec![3.5, 120.0],
        vec![f64::NAN, 80.0],
        vec![1.25, 310.0],
        vec![2.0, 95.0],
    ])?);

    let mut labels = Annotation::with_label("prices");
    for (row, day) in ["mon", "tue", "wed", "thu"].into_iter().enumerate() {
        labels.set_axis_label(ROW, row, Some(Value::from(day)));
    }
    prices.set_annotation(Some(labels));

    // NEW: fresh storage
    let means = prices.mean(CalcMode::New, Dimension::Row, true)?;
    println!("Column means (NaN skipped): {:?}", means.to_vec_f64()?);

    // LINK: a live view that follows the source
    let totals = prices.sum(CalcMode::Link, Dimension::Row, true)?;
    let changes = Arc::new(AtomicUsize::new(0));
    let counter = changes.clone();
    totals.add_listener(Arc::new(move |_: &ndcalc::ChangeEvent| {
        counter.fetch_add(1, Ordering::Relaxed);
    }));

    println!("Column totals before: {:?}", totals.to_vec_f64()?);
    prices.set_f64(&Coordinate::from([1, 0]), 4.0)?;
    println!("Column totals after:  {:?}", totals.to_vec_f64()?);
    println!("View notifications:   {}", changes.load(Ordering::Relaxed));

    // Sorted by volume, labels follow their rows
    let sorted = prices.sort(CalcMode::New, 1)?;
    if let Some(annotation) = sorted.annotation() {
        let order: Vec<String> = annotation
            .axis_labels(ROW)
            .map(|(_, label)| label.to_string())
            .collect();
        println!("Days by volume: {}", order.join(", "));
    }

    // ORIG: only valid when the size is kept
    let absolute = prices.apply(CalcMode::Orig, ndcalc::UnaryOp::Round)?;
    println!("Rounded in place: {:?}", absolute.to_vec_f64()?);

    match prices.sum(CalcMode::Orig, Dimension::Row, true) {
        Ok(_) => println!("unexpected in-place reduction"),
        Err(err) => println!("In-place reduction refused: {err}"),
    }

    Ok(())
}
