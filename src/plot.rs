//! Boxplot rendering for responder vs. non-responder comparisons.

use crate::config::PopulationSet;
use crate::data::{FrequencyTable, Response};
use crate::error::{CytoError, Result};
use plotters::prelude::*;
use std::path::Path;

const SUBPLOT_WIDTH: u32 = 300;
const PLOT_HEIGHT: u32 = 420;

/// Render one percentage boxplot per population, split by response group,
/// to a PNG file.
///
/// The input is the filtered long table returned by cohort comparison. Rows
/// without a defined response or with NaN percentages are skipped. An input
/// with no plottable rows is reported as [`CytoError::EmptyData`] rather than
/// producing an empty image.
pub fn render_response_boxplots<P: AsRef<Path>>(
    frequencies: &FrequencyTable,
    populations: &PopulationSet,
    path: P,
) -> Result<()> {
    let plottable = frequencies
        .iter()
        .any(|r| r.response.is_defined() && !r.percentage.is_nan());
    if !plottable {
        return Err(CytoError::EmptyData(
            "No rows to plot for response comparison".to_string(),
        ));
    }

    let draw_err = |e: &dyn std::error::Error| CytoError::Plot(e.to_string());

    let width = SUBPLOT_WIDTH * populations.len() as u32;
    let root = BitMapBackend::new(path.as_ref(), (width, PLOT_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| draw_err(&e))?;

    let areas = root.split_evenly((1, populations.len()));
    for (area, population) in areas.iter().zip(populations.iter()) {
        let non_responders = frequencies.percentages(population, Response::NonResponder);
        let responders = frequencies.percentages(population, Response::Responder);

        let mut chart = ChartBuilder::on(area)
            .caption(population, ("sans-serif", 16))
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(45)
            .build_cartesian_2d(0i32..3i32, 0f32..100f32)
            .map_err(|e| draw_err(&e))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_label_formatter(&|x| match *x {
                1 => "n".to_string(),
                2 => "y".to_string(),
                _ => String::new(),
            })
            .x_desc("response")
            .y_desc("relative frequency (%)")
            .draw()
            .map_err(|e| draw_err(&e))?;

        let groups = [(1, non_responders), (2, responders)];
        chart
            .draw_series(
                groups
                    .iter()
                    .filter(|(_, values)| !values.is_empty())
                    .map(|(x, values)| Boxplot::new_vertical(*x, &Quartiles::new(values))),
            )
            .map_err(|e| draw_err(&e))?;
    }

    root.present().map_err(|e| draw_err(&e))?;
    Ok(())
}
