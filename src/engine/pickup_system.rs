use super::*;

impl MatchEngine {
    /// Consumes whatever item sits on `cell` and applies its effect.
    pub(super) fn collect_item(&mut self, cell: GridPos) {
        let Some(kind) = self.maze.consume_item(cell) else {
            return;
        };
        match kind {
            ItemKind::Pellet => {
                self.add_score(self.options.pellet_score);
                self.stats.pellets += 1;
                self.events.push(GameEvent::PelletEaten { cell });
            }
            ItemKind::PowerPellet => {
                self.add_score(self.options.power_pellet_score);
                self.stats.power_pellets += 1;
                self.ghost_chain = 0;
                let duration = self.options.evasion_seconds;
                let affected = self
                    .ghosts
                    .iter_mut()
                    .map(|ghost| ghost.activate_evasion(duration))
                    .filter(|activated| *activated)
                    .count();
                debug!(
                    row = cell.row,
                    col = cell.col,
                    affected,
                    "power pellet eaten"
                );
                self.events.push(GameEvent::PowerPelletEaten { cell });
            }
        }
    }

    pub(super) fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
        self.high_score = self.high_score.max(self.score);
    }
}
