use crate::domain::model::GridTile;
use std::io::{BufRead, Write};

/// Dry run 時列出所有網格
pub fn print_tile_plan<W: Write>(tiles: &[GridTile], output: &mut W) -> std::io::Result<()> {
    writeln!(
        output,
        "{:<12} {:>5} {:>5} {:>12} {:>12} {:>10}",
        "name", "row", "col", "latitude", "longitude", "radius_m"
    )?;
    for tile in tiles {
        writeln!(
            output,
            "{:<12} {:>5} {:>5} {:>12.6} {:>12.6} {:>10}",
            tile.name,
            tile.row,
            tile.col,
            tile.center.latitude,
            tile.center.longitude,
            tile.radius_meters
        )?;
    }
    writeln!(output, "{} tiles", tiles.len())
}

/// 顯示預計的 API 呼叫次數並詢問是否繼續，只有輸入 `y` 才會回傳 true
pub fn confirm_api_calls<R: BufRead, W: Write>(
    tile_count: usize,
    input: &mut R,
    output: &mut W,
) -> std::io::Result<bool> {
    writeln!(output, "Generated {} tiles", tile_count)?;
    writeln!(
        output,
        "The scan will call the Places API {} times; see https://mapsplatform.google.com/pricing/ for quota and cost",
        tile_count
    )?;
    write!(output, "Continue? (y/n): ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}
