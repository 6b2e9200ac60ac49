use crate::data::Bar;

//indicator helpers aligned with their input: output index i describes
//input index i, with None during the warm-up prefix

//exponential moving average in span form, seeded with the first value
//alpha = 2 / (span + 1)
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut current = values[0];
    out.push(current);

    for &value in &values[1..] {
        current = alpha * value + (1.0 - alpha) * current;
        out.push(current);
    }

    out
}

//simple moving average over a fixed window
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    let mut sum: f64 = values[..window].iter().sum();
    out[window - 1] = Some(sum / window as f64);

    for i in window..values.len() {
        sum += values[i] - values[i - window];
        out[i] = Some(sum / window as f64);
    }

    out
}

//triangular moving average: an sma of an sma, each over ceil((length + 1) / 2)
pub fn trima(values: &[f64], length: usize) -> Vec<Option<f64>> {
    let n = (length + 2) / 2;
    let first = sma(values, n);

    //second smoothing pass over the defined part of the first
    let mut out = vec![None; values.len()];
    for i in 0..values.len() {
        if i + 1 < 2 * n - 1 {
            continue;
        }
        let window = &first[i + 1 - n..=i];
        if window.iter().all(|v| v.is_some()) {
            let sum: f64 = window.iter().flatten().sum();
            out[i] = Some(sum / n as f64);
        }
    }

    out
}

//true range: max of bar range, |high - prev close|, |low - prev close|
//undefined on the first bar
pub fn true_range(bars: &[Bar]) -> Vec<Option<f64>> {
    let mut out = vec![None; bars.len()];
    for i in 1..bars.len() {
        let prev_close = bars[i - 1].close;
        let tr = bars[i]
            .range()
            .max((bars[i].high - prev_close).abs())
            .max((bars[i].low - prev_close).abs());
        out[i] = Some(tr);
    }
    out
}

//average true range: simple rolling mean of true range
//undefined until a full window of true ranges is available
pub fn atr(bars: &[Bar], window: usize) -> Vec<Option<f64>> {
    let tr = true_range(bars);
    let mut out = vec![None; bars.len()];
    if window == 0 {
        return out;
    }

    for i in 0..bars.len() {
        if i + 1 < window {
            continue;
        }
        let slice = &tr[i + 1 - window..=i];
        if slice.iter().all(|v| v.is_some()) {
            let sum: f64 = slice.iter().map(|v| v.unwrap_or(0.0)).sum();
            out[i] = Some(sum / window as f64);
        }
    }

    out
}

//percent change over a lookback of `periods` bars
pub fn momentum(values: &[f64], periods: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    for i in periods..values.len() {
        let base = values[i - periods];
        if base != 0.0 {
            out[i] = Some((values[i] / base - 1.0) * 100.0);
        }
    }
    out
}
